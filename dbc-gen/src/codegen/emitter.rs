//! Output capability used by the tree walkers
//!
//! The decode/class tree emitter and the value description emitter only talk
//! to this trait. A concrete implementation decides the target syntax; the
//! walkers decide what is declared and in which nesting order.

use std::io;

/// Target-neutral type reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRef<'a> {
    /// Integer (identifiers, enum constants)
    Int,
    /// Any number (decoded signal values)
    Number,
    /// A named class or runtime type
    Named(&'a str),
}

/// How a constructor parameter is bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Ordinary parameter
    Plain,
    /// Parameter that initializes the field of the same name
    Field,
}

/// Function or constructor parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param<'a> {
    pub name: &'a str,
    pub ty: Option<TypeRef<'a>>,
    pub kind: ParamKind,
}

impl<'a> Param<'a> {
    pub fn plain(name: &'a str) -> Self {
        Self {
            name,
            ty: None,
            kind: ParamKind::Plain,
        }
    }

    pub fn field(name: &'a str) -> Self {
        Self {
            name,
            ty: None,
            kind: ParamKind::Field,
        }
    }

    pub fn typed(name: &'a str, ty: TypeRef<'a>) -> Self {
        Self {
            name,
            ty: Some(ty),
            kind: ParamKind::Plain,
        }
    }
}

/// Structured code sink
///
/// `begin_*` calls open a scope that the matching `end_*` call closes; the
/// walkers always nest them properly. Expression builders return target text
/// that can be passed back as an initializer, guard or argument.
pub trait Emitter {
    fn import(&mut self, module: &str) -> io::Result<()>;

    fn begin_class(&mut self, name: &str, parent: Option<&str>, capabilities: &[&str]) -> io::Result<()>;
    fn end_class(&mut self) -> io::Result<()>;

    /// Class-level constant
    fn static_constant(&mut self, name: &str, ty: TypeRef<'_>, value: &str) -> io::Result<()>;
    /// Module-level constant
    fn constant(&mut self, name: &str, ty: TypeRef<'_>, value: &str) -> io::Result<()>;
    /// Mutable field with a default value
    fn field(&mut self, name: &str, ty: TypeRef<'_>, default: &str) -> io::Result<()>;

    /// Open a constructor; `super_args` forwards values to the parent constructor
    fn begin_constructor(&mut self, params: &[Param<'_>], super_args: Option<&[&str]>) -> io::Result<()>;
    fn end_constructor(&mut self) -> io::Result<()>;

    fn begin_function(&mut self, name: &str, params: &[Param<'_>], ret: Option<TypeRef<'_>>) -> io::Result<()>;
    fn end_function(&mut self) -> io::Result<()>;

    /// Declare and initialize a local variable
    fn local(&mut self, name: &str, ty: TypeRef<'_>, init: &str) -> io::Result<()>;
    fn assign(&mut self, name: &str, value: &str) -> io::Result<()>;
    fn return_statement(&mut self, value: &str) -> io::Result<()>;

    /// Open a block executed when `guard` holds
    fn begin_conditional(&mut self, guard: &str) -> io::Result<()>;
    fn end_conditional(&mut self) -> io::Result<()>;

    /// Abort the current function with an error
    fn raise(&mut self, reason: &str) -> io::Result<()>;

    /// Raw statement escape hatch
    fn statement(&mut self, raw: &str) -> io::Result<()>;
    fn blank_line(&mut self) -> io::Result<()>;

    /// Call (or construct) `callee` with positional arguments
    fn call(&self, callee: &str, args: &[String]) -> String;
    /// Equality test
    fn equals(&self, lhs: &str, rhs: &str) -> String;
    /// Boolean named flag argument
    fn flag(&self, name: &str) -> String;
}
