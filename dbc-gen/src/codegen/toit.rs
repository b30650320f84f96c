//! Toit source emitter

use crate::codegen::emitter::{Emitter, Param, ParamKind, TypeRef};
use std::io::{self, Write};

const INDENT: &str = "  ";

/// Writes Toit source to any `Write` sink
///
/// Blocks are colon-terminated headers with two-space indentation. Blank
/// lines never repeat and never open the output.
pub struct ToitEmitter<W: Write> {
    out: W,
    indent: usize,
    last_blank: bool,
}

impl<W: Write> ToitEmitter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            indent: 0,
            last_blank: true,
        }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        for _ in 0..self.indent {
            self.out.write_all(INDENT.as_bytes())?;
        }
        self.out.write_all(text.as_bytes())?;
        self.out.write_all(b"\n")?;
        self.last_blank = false;
        Ok(())
    }

    fn open(&mut self, header: &str) -> io::Result<()> {
        self.line(&format!("{}:", header))?;
        self.indent += 1;
        Ok(())
    }

    fn close(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }
}

fn type_name(ty: TypeRef<'_>) -> &str {
    match ty {
        TypeRef::Int => "int",
        TypeRef::Number => "num",
        TypeRef::Named(name) => name,
    }
}

fn typed(name: &str, ty: TypeRef<'_>) -> String {
    format!("{}/{}", name, type_name(ty))
}

fn param_list(params: &[Param<'_>]) -> String {
    params
        .iter()
        .map(|p| {
            let name = match p.kind {
                ParamKind::Plain => p.name.to_string(),
                ParamKind::Field => format!(".{}", p.name),
            };
            match p.ty {
                Some(ty) => format!(" {}", typed(&name, ty)),
                None => format!(" {}", name),
            }
        })
        .collect()
}

fn quote(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

impl<W: Write> Emitter for ToitEmitter<W> {
    fn import(&mut self, module: &str) -> io::Result<()> {
        self.line(&format!("import {}", module))
    }

    fn begin_class(&mut self, name: &str, parent: Option<&str>, capabilities: &[&str]) -> io::Result<()> {
        let mut header = format!("class {}", name);
        if let Some(parent) = parent {
            header.push_str(" extends ");
            header.push_str(parent);
        }
        if !capabilities.is_empty() {
            header.push_str(" implements ");
            header.push_str(&capabilities.join(" "));
        }
        self.open(&header)
    }

    fn end_class(&mut self) -> io::Result<()> {
        self.close();
        Ok(())
    }

    fn static_constant(&mut self, name: &str, ty: TypeRef<'_>, value: &str) -> io::Result<()> {
        self.line(&format!("static {} ::= {}", typed(name, ty), value))
    }

    fn constant(&mut self, name: &str, ty: TypeRef<'_>, value: &str) -> io::Result<()> {
        self.line(&format!("{} ::= {}", typed(name, ty), value))
    }

    fn field(&mut self, name: &str, ty: TypeRef<'_>, default: &str) -> io::Result<()> {
        self.line(&format!("{} := {}", typed(name, ty), default))
    }

    fn begin_constructor(&mut self, params: &[Param<'_>], super_args: Option<&[&str]>) -> io::Result<()> {
        self.open(&format!("constructor{}", param_list(params)))?;
        match super_args {
            Some(args) if !args.is_empty() => self.line(&format!("super {}", args.join(" "))),
            _ => Ok(()),
        }
    }

    fn end_constructor(&mut self) -> io::Result<()> {
        self.close();
        Ok(())
    }

    fn begin_function(&mut self, name: &str, params: &[Param<'_>], ret: Option<TypeRef<'_>>) -> io::Result<()> {
        let mut header = format!("{}{}", name, param_list(params));
        if let Some(ret) = ret {
            header.push_str(" -> ");
            header.push_str(type_name(ret));
        }
        self.open(&header)
    }

    fn end_function(&mut self) -> io::Result<()> {
        self.close();
        Ok(())
    }

    fn local(&mut self, name: &str, ty: TypeRef<'_>, init: &str) -> io::Result<()> {
        self.line(&format!("{} := {}", typed(name, ty), init))
    }

    fn assign(&mut self, name: &str, value: &str) -> io::Result<()> {
        self.line(&format!("{} = {}", name, value))
    }

    fn return_statement(&mut self, value: &str) -> io::Result<()> {
        self.line(&format!("return {}", value))
    }

    fn begin_conditional(&mut self, guard: &str) -> io::Result<()> {
        self.open(&format!("if {}", guard))
    }

    fn end_conditional(&mut self) -> io::Result<()> {
        self.close();
        Ok(())
    }

    fn raise(&mut self, reason: &str) -> io::Result<()> {
        self.line(&format!("throw {}", quote(reason)))
    }

    fn statement(&mut self, raw: &str) -> io::Result<()> {
        self.line(raw)
    }

    fn blank_line(&mut self) -> io::Result<()> {
        if self.last_blank {
            return Ok(());
        }
        self.out.write_all(b"\n")?;
        self.last_blank = true;
        Ok(())
    }

    fn call(&self, callee: &str, args: &[String]) -> String {
        let mut expr = callee.to_string();
        for arg in args {
            expr.push(' ');
            if arg.contains(' ') && !arg.starts_with("--") {
                expr.push('(');
                expr.push_str(arg);
                expr.push(')');
            } else {
                expr.push_str(arg);
            }
        }
        expr
    }

    fn equals(&self, lhs: &str, rhs: &str) -> String {
        format!("{} == {}", lhs, rhs)
    }

    fn flag(&self, name: &str) -> String {
        format!("--{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut ToitEmitter<Vec<u8>>) -> io::Result<()>) -> String {
        let mut emitter = ToitEmitter::new(Vec::new());
        f(&mut emitter).unwrap();
        String::from_utf8(emitter.into_inner()).unwrap()
    }

    #[test]
    fn test_class_with_fields_and_constructors() {
        let out = render(|e| {
            e.begin_class("Msg_A", Some("Msg"), &[])?;
            e.static_constant("ID", TypeRef::Int, "256")?;
            e.blank_line()?;
            e.field("A", TypeRef::Number, "0")?;
            e.blank_line()?;
            e.begin_constructor(&[], None)?;
            e.end_constructor()?;
            e.blank_line()?;
            e.begin_constructor(
                &[Param::plain("S"), Param::plain("C"), Param::field("A")],
                Some(&["S", "C"]),
            )?;
            e.end_constructor()?;
            e.end_class()
        });

        let expected = "\
class Msg_A extends Msg:
  static ID/int ::= 256

  A/num := 0

  constructor:

  constructor S C .A:
    super S C
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_function_with_conditional() {
        let out = render(|e| {
            e.begin_class("MsgDecoder", None, &["dbc.Decoder"])?;
            e.begin_function(
                "decode",
                &[Param::typed("reader", TypeRef::Named("dbc.Reader"))],
                Some(TypeRef::Named("Msg")),
            )?;
            let read = e.call("reader.read", &["0".to_string(), "8".to_string(), e.flag("signed")]);
            e.local("S", TypeRef::Number, &read)?;
            let guard = e.equals("S", "1");
            e.begin_conditional(&guard)?;
            e.raise("bad \"S\"")?;
            e.end_conditional()?;
            e.return_statement("message")?;
            e.end_function()?;
            e.end_class()
        });

        let expected = "\
class MsgDecoder implements dbc.Decoder:
  decode reader/dbc.Reader -> Msg:
    S/num := reader.read 0 8 --signed
    if S == 1:
      throw \"bad \\\"S\\\"\"
    return message
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_blank_lines_collapse() {
        let out = render(|e| {
            e.blank_line()?;
            e.import("dbc")?;
            e.blank_line()?;
            e.blank_line()?;
            e.constant("X_ON", TypeRef::Int, "1")
        });
        assert_eq!(out, "import dbc\n\nX_ON/int ::= 1\n");
    }

    #[test]
    fn test_call_parenthesizes_compound_arguments() {
        let e = ToitEmitter::new(Vec::new());
        let inner = e.call("f", &["x".to_string()]);
        assert_eq!(e.call("g", &[inner, "-1".to_string()]), "g (f x) -1");
    }
}
