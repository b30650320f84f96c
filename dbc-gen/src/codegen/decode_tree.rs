//! Class hierarchy and decode routine emission
//!
//! Every node of a message's multiplex tree becomes a class extending its
//! parent node's class. The message's decoder class then reads the root's
//! signals, branches on each switch value and recurses, so the decoded value
//! is always an instance of the most specific matching class.

use crate::codegen::emitter::{Emitter, Param, TypeRef};
use crate::codegen::format_number;
use crate::codegen::layout::{needs_conversion, start_offset};
use crate::codegen::multiplex::MultiplexNode;
use crate::config::{GeneratorConfig, UnmatchedSwitch};
use crate::signals::catalog::SignalCatalog;
use crate::signals::database::MessageDefinition;
use std::io;

/// Local variable holding the decoded instance
const MESSAGE_LOCAL: &str = "message";
/// Parameter name of the runtime bit reader
const READER_PARAM: &str = "reader";

/// Emit the class tree and decoder class for one message
pub fn emit_message<E: Emitter + ?Sized>(
    emitter: &mut E,
    message: &MessageDefinition,
    tree: &MultiplexNode,
    config: &GeneratorConfig,
) -> io::Result<()> {
    let catalog = SignalCatalog::new(message);
    let message_local = unused_name(&catalog, MESSAGE_LOCAL, &message.name);
    let reader_param = unused_name(&catalog, READER_PARAM, &message.name);
    let walker = TreeWalker {
        message,
        catalog,
        config,
        message_local,
        reader_param,
    };
    walker.emit_classes(emitter, tree, None)?;
    walker.emit_decoder(emitter, tree)
}

/// `base`, with `_` appended until no signal of the message uses it
fn unused_name(catalog: &SignalCatalog<'_>, base: &str, message: &str) -> String {
    let mut name = base.to_string();
    while catalog.contains(&name) {
        name.push('_');
    }
    if name != base {
        log::warn!(
            "{}: signal '{}' shadows a generated name, using '{}' instead",
            message,
            base,
            name
        );
    }
    name
}

struct TreeWalker<'a> {
    message: &'a MessageDefinition,
    catalog: SignalCatalog<'a>,
    config: &'a GeneratorConfig,
    message_local: String,
    reader_param: String,
}

impl TreeWalker<'_> {
    fn runtime(&self, item: &str) -> String {
        format!("{}.{}", self.config.runtime_module, item)
    }

    fn emit_classes<E: Emitter + ?Sized>(
        &self,
        e: &mut E,
        node: &MultiplexNode,
        parent: Option<&str>,
    ) -> io::Result<()> {
        e.begin_class(&node.class_name, parent, &[])?;
        e.static_constant("ID", TypeRef::Int, &self.message.can_id().to_string())?;
        e.blank_line()?;

        for signal in &node.signals {
            e.field(signal, TypeRef::Number, "0")?;
        }
        e.blank_line()?;

        e.begin_constructor(&[], None)?;
        e.end_constructor()?;

        if !node.inherited.is_empty() || !node.signals.is_empty() {
            let params: Vec<Param<'_>> = node
                .inherited
                .iter()
                .map(|s| Param::plain(s))
                .chain(node.signals.iter().map(|s| Param::field(s)))
                .collect();
            let inherited: Vec<&str> = node.inherited.iter().map(String::as_str).collect();
            e.blank_line()?;
            e.begin_constructor(&params, parent.map(|_| inherited.as_slice()))?;
            e.end_constructor()?;
        }

        e.end_class()?;
        e.blank_line()?;

        for child in &node.children {
            self.emit_classes(e, child, Some(node.class_name.as_str()))?;
        }
        Ok(())
    }

    fn emit_decoder<E: Emitter + ?Sized>(&self, e: &mut E, root: &MultiplexNode) -> io::Result<()> {
        let name = self.message.name.as_str();
        let capability = self.runtime("Decoder");
        let reader_type = self.runtime("Reader");

        e.begin_class(&format!("{}Decoder", name), None, &[capability.as_str()])?;

        e.begin_function("id", &[], Some(TypeRef::Int))?;
        e.return_statement(&format!("{}.ID", name))?;
        e.end_function()?;
        e.blank_line()?;

        e.begin_function(
            "decode",
            &[Param::typed(&self.reader_param, TypeRef::Named(reader_type.as_str()))],
            Some(TypeRef::Named(name)),
        )?;
        self.emit_decode(e, root)?;
        e.end_function()?;

        e.end_class()?;
        e.blank_line()
    }

    fn emit_decode<E: Emitter + ?Sized>(&self, e: &mut E, node: &MultiplexNode) -> io::Result<()> {
        for signal in &node.signals {
            self.emit_signal_read(e, signal)?;
        }

        for child in &node.children {
            let Some(selector) = &child.selector else {
                continue;
            };
            let guard = e.equals(&selector.switch, &selector.value.to_string());
            e.begin_conditional(&guard)?;
            self.emit_decode(e, child)?;
            e.end_conditional()?;
        }

        if !node.is_leaf() && self.config.unmatched_switch == UnmatchedSwitch::Fail {
            let mut switches: Vec<&str> = Vec::new();
            for child in &node.children {
                if let Some(selector) = &child.selector {
                    if !switches.contains(&selector.switch.as_str()) {
                        switches.push(selector.switch.as_str());
                    }
                }
            }
            return e.raise(&format!(
                "{}: unknown value of {}",
                node.class_name,
                switches.join("/")
            ));
        }

        let args: Vec<String> = node.all_signals().map(String::from).collect();
        let instance = e.call(&node.class_name, &args);
        e.local(&self.message_local, TypeRef::Named(node.class_name.as_str()), &instance)?;
        e.return_statement(&self.message_local)
    }

    fn emit_signal_read<E: Emitter + ?Sized>(&self, e: &mut E, name: &str) -> io::Result<()> {
        let signal = self.catalog.get(name).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("signal '{}' not found in message '{}'", name, self.message.name),
            )
        })?;

        let mut args = vec![
            start_offset(signal).to_string(),
            signal.length.to_string(),
        ];
        if signal.is_signed() {
            args.push(e.flag("signed"));
        }
        let read = e.call(&format!("{}.read", self.reader_param), &args);
        e.local(name, TypeRef::Number, &read)?;

        if needs_conversion(signal) {
            let convert = e.call(
                &self.runtime("to_physical"),
                &[
                    name.to_string(),
                    format_number(signal.factor),
                    format_number(signal.offset),
                    format_number(signal.min),
                    format_number(signal.max),
                ],
            );
            e.assign(name, &convert)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::multiplex::resolve;
    use crate::signals::database::fixtures::{fact, message, signal};
    use crate::signals::database::{ByteOrder, MultiplexRole, ValueType};

    /// Records emitter calls as flat, syntax-free lines
    #[derive(Default)]
    struct Recorder {
        ops: Vec<String>,
    }

    impl Recorder {
        fn push(&mut self, op: String) -> io::Result<()> {
            self.ops.push(op);
            Ok(())
        }
    }

    fn params(params: &[Param<'_>]) -> String {
        params
            .iter()
            .map(|p| match p.kind {
                crate::codegen::emitter::ParamKind::Plain => p.name.to_string(),
                crate::codegen::emitter::ParamKind::Field => format!(".{}", p.name),
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    impl Emitter for Recorder {
        fn import(&mut self, module: &str) -> io::Result<()> {
            self.push(format!("import {}", module))
        }
        fn begin_class(&mut self, name: &str, parent: Option<&str>, caps: &[&str]) -> io::Result<()> {
            self.push(format!("class {} < {} [{}]", name, parent.unwrap_or("-"), caps.join(",")))
        }
        fn end_class(&mut self) -> io::Result<()> {
            self.push("end class".to_string())
        }
        fn static_constant(&mut self, name: &str, _: TypeRef<'_>, value: &str) -> io::Result<()> {
            self.push(format!("static {}={}", name, value))
        }
        fn constant(&mut self, name: &str, _: TypeRef<'_>, value: &str) -> io::Result<()> {
            self.push(format!("const {}={}", name, value))
        }
        fn field(&mut self, name: &str, _: TypeRef<'_>, default: &str) -> io::Result<()> {
            self.push(format!("field {}={}", name, default))
        }
        fn begin_constructor(&mut self, p: &[Param<'_>], super_args: Option<&[&str]>) -> io::Result<()> {
            let sup = super_args.map(|a| a.join(",")).unwrap_or_else(|| "-".to_string());
            self.push(format!("ctor({}) super({})", params(p), sup))
        }
        fn end_constructor(&mut self) -> io::Result<()> {
            self.push("end ctor".to_string())
        }
        fn begin_function(&mut self, name: &str, p: &[Param<'_>], _: Option<TypeRef<'_>>) -> io::Result<()> {
            self.push(format!("fn {}({})", name, params(p)))
        }
        fn end_function(&mut self) -> io::Result<()> {
            self.push("end fn".to_string())
        }
        fn local(&mut self, name: &str, _: TypeRef<'_>, init: &str) -> io::Result<()> {
            self.push(format!("let {} = {}", name, init))
        }
        fn assign(&mut self, name: &str, value: &str) -> io::Result<()> {
            self.push(format!("set {} = {}", name, value))
        }
        fn return_statement(&mut self, value: &str) -> io::Result<()> {
            self.push(format!("return {}", value))
        }
        fn begin_conditional(&mut self, guard: &str) -> io::Result<()> {
            self.push(format!("if {}", guard))
        }
        fn end_conditional(&mut self) -> io::Result<()> {
            self.push("end if".to_string())
        }
        fn raise(&mut self, reason: &str) -> io::Result<()> {
            self.push(format!("raise {}", reason))
        }
        fn statement(&mut self, raw: &str) -> io::Result<()> {
            self.push(raw.to_string())
        }
        fn blank_line(&mut self) -> io::Result<()> {
            Ok(())
        }
        fn call(&self, callee: &str, args: &[String]) -> String {
            format!("{}({})", callee, args.join(","))
        }
        fn equals(&self, lhs: &str, rhs: &str) -> String {
            format!("{}=={}", lhs, rhs)
        }
        fn flag(&self, name: &str) -> String {
            format!("+{}", name)
        }
    }

    fn record(msg: &MessageDefinition, facts: &[crate::signals::database::MultiplexValueDef], config: &GeneratorConfig) -> Vec<String> {
        let tree = resolve(msg, facts).tree();
        let mut rec = Recorder::default();
        emit_message(&mut rec, msg, &tree, config).unwrap();
        rec.ops
    }

    fn two_level_message() -> MessageDefinition {
        message(
            0x64,
            "Msg",
            vec![
                signal("S", 0, MultiplexRole::Switch),
                signal("D", 8, MultiplexRole::MultiplexedSwitch(2)),
                signal("E", 16, MultiplexRole::Multiplexed(5)),
            ],
        )
    }

    #[test]
    fn test_plain_message() {
        let msg = message(0x10, "Status", vec![signal("Level", 0, MultiplexRole::Plain)]);
        let ops = record(&msg, &[], &GeneratorConfig::default());

        let expected = [
            "class Status < - []",
            "static ID=16",
            "field Level=0",
            "ctor() super(-)",
            "end ctor",
            "ctor(.Level) super(-)",
            "end ctor",
            "end class",
            "class StatusDecoder < - [dbc.Decoder]",
            "fn id()",
            "return Status.ID",
            "end fn",
            "fn decode(reader)",
            "let Level = reader.read(0,8)",
            "let message = Status(Level)",
            "return message",
            "end fn",
            "end class",
        ];
        assert_eq!(ops, expected);
    }

    #[test]
    fn test_three_class_levels() {
        let msg = two_level_message();
        let ops = record(&msg, &[fact(0x64, "E", "D", 5, 5)], &GeneratorConfig::default());

        let classes: Vec<&str> = ops
            .iter()
            .filter(|op| op.starts_with("class "))
            .map(String::as_str)
            .collect();
        assert_eq!(
            classes,
            [
                "class Msg < - []",
                "class Msg_D < Msg []",
                "class Msg_D_E < Msg_D []",
                "class MsgDecoder < - [dbc.Decoder]",
            ]
        );

        // E's constructor takes S and D as inherited values and forwards them
        assert!(ops.contains(&"ctor(S,D,.E) super(S,D)".to_string()));
        assert!(ops.contains(&"ctor(S,.D) super(S)".to_string()));
    }

    #[test]
    fn test_decode_branches_and_recurses() {
        let msg = two_level_message();
        let ops = record(&msg, &[fact(0x64, "E", "D", 5, 5)], &GeneratorConfig::default());

        let start = ops.iter().position(|op| op == "fn decode(reader)").unwrap();
        let body: Vec<&str> = ops[start + 1..].iter().map(String::as_str).collect();
        let expected = [
            "let S = reader.read(0,8)",
            "if S==2",
            "let D = reader.read(8,8)",
            "if D==5",
            "let E = reader.read(16,8)",
            "let message = Msg_D_E(S,D,E)",
            "return message",
            "end if",
            "let message = Msg_D(S,D)",
            "return message",
            "end if",
            "let message = Msg(S)",
            "return message",
            "end fn",
            "end class",
        ];
        assert_eq!(body, expected);
    }

    #[test]
    fn test_fail_policy_raises_after_branches() {
        let msg = two_level_message();
        let config = GeneratorConfig::new().with_unmatched_switch(UnmatchedSwitch::Fail);
        let ops = record(&msg, &[fact(0x64, "E", "D", 5, 5)], &config);

        assert!(ops.contains(&"raise Msg: unknown value of S".to_string()));
        assert!(ops.contains(&"raise Msg_D: unknown value of D".to_string()));
        // Only the leaf still constructs an instance
        let constructs: Vec<&String> = ops.iter().filter(|op| op.starts_with("let message")).collect();
        assert_eq!(constructs, ["let message = Msg_D_E(S,D,E)"]);
    }

    #[test]
    fn test_conversion_and_signedness() {
        let mut temp = signal("Temp", 23, MultiplexRole::Plain);
        temp.length = 16;
        temp.byte_order = ByteOrder::BigEndian;
        temp.value_type = ValueType::Signed;
        temp.factor = 0.1;
        temp.offset = -40.0;
        temp.min = -40.0;
        temp.max = 215.5;
        let msg = message(0x20, "Climate", vec![temp]);

        let config = GeneratorConfig::new().with_runtime_module("can");
        let ops = record(&msg, &[], &config);

        assert!(ops.contains(&"class ClimateDecoder < - [can.Decoder]".to_string()));
        assert!(ops.contains(&"let Temp = reader.read(8,16,+signed)".to_string()));
        assert!(ops.contains(&"set Temp = can.to_physical(Temp,0.1,-40,-40,215.5)".to_string()));
    }

    #[test]
    fn test_generated_names_avoid_signal_names() {
        let msg = message(
            0x30,
            "Wrapper",
            vec![
                signal("message", 0, MultiplexRole::Plain),
                signal("reader", 8, MultiplexRole::Plain),
                signal("reader_", 16, MultiplexRole::Plain),
            ],
        );
        let ops = record(&msg, &[], &GeneratorConfig::default());

        assert!(ops.contains(&"fn decode(reader__)".to_string()));
        assert!(ops.contains(&"let message = reader__.read(0,8)".to_string()));
        assert!(ops.contains(&"let message_ = Wrapper(message,reader,reader_)".to_string()));
        assert!(ops.contains(&"return message_".to_string()));
    }

    #[test]
    fn test_extended_id_is_masked() {
        let msg = message(0x8000_0400, "Ext", vec![signal("A", 0, MultiplexRole::Plain)]);
        let ops = record(&msg, &[], &GeneratorConfig::default());
        assert!(ops.contains(&"static ID=1024".to_string()));
    }
}
