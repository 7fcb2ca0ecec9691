use std::borrow::Cow;
use std::fmt::{self, Display};

use byte_string::ByteStr;
use serde::Serialize;

use crate::parse::token::Symbol;
use crate::position::{HasSpan, Span, Spanned};
use crate::util::CloneStatic;

pub mod dump;

macro_rules! impl_has_span {
    ($type:ty) => {
        impl HasSpan for $type {
            fn span(&self) -> Cow<'_, Span> {
                Cow::Borrowed(&self.span)
            }
        }
    };

    (|&$s:ident: $type:ty| $body:expr) => {
        impl HasSpan for $type {
            fn span(&$s) -> Cow<'_, Span> {
                Cow::Borrowed($body)
            }
        }
    };

    (&$s:ident: $type:ty => $body:expr) => {
        impl HasSpan for $type {
            fn span(&$s) -> Cow<'_, Span> {
                $body
            }
        }
    };
}

macro_rules! define_symbol_kind {
    ($name:ident { $( $kind:ident => $symbol:ident, )+ }) => {
        #[derive(Serialize, Debug, Clone, Copy, Eq, PartialEq, Hash)]
        pub enum $name {
            $( $kind, )+
        }

        impl $name {
            pub fn symbol(self) -> Symbol {
                match self {
                    $( Self::$kind => Symbol::$symbol, )+
                }
            }
        }

        impl TryFrom<Symbol> for $name {
            type Error = ();

            fn try_from(symbol: Symbol) -> Result<Self, Self::Error> {
                match symbol {
                    $( Symbol::$symbol => Ok(Self::$kind), )+
                    _ => Err(()),
                }
            }
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Program<'buf> {
    pub body: Vec<Stmt<'buf>>,
    pub span: Span,
}

impl_has_span!(Program<'_>);

#[derive(Serialize, Clone, Eq, PartialEq, Hash)]
pub struct Name<'buf>(pub Spanned<Cow<'buf, [u8]>>);

impl Name<'_> {
    pub fn as_slice(&self) -> &[u8] {
        &self.0.value
    }
}

impl_has_span!(|&self: Name<'_>| &self.0.span);

impl fmt::Debug for Name<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Name")
            .field("span", &self.0.span)
            .field("value", &ByteStr::new(&self.0.value))
            .finish()
    }
}

impl Display for Name<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0.value))
    }
}

impl CloneStatic<Name<'static>> for Name<'_> {
    fn clone_static(&self) -> Name<'static> {
        Name(Spanned {
            value: self.0.value.clone_static(),
            span: self.0.span.clone(),
        })
    }
}

define_symbol_kind!(TyKind {
    Void => Void,
    Bool => Bool,
    Int => Int,
    Real => Real,
    String => String,
});

/// A type with its modifiers and the name it is bound to.
///
/// Function parameters, variable definitions, and the return slot of a function (bound to the
/// function's name) all use this shape.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct VarDecl<'buf> {
    pub ty: TyKind,
    pub name: Name<'buf>,
    pub mutable: bool,
    pub reference: bool,
    pub span: Span,
}

impl_has_span!(VarDecl<'_>);

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum Stmt<'buf> {
    VarDef(VarDef<'buf>),
    FuncDef(FuncDef<'buf>),
    Label(LabelStmt<'buf>),
    If(If<'buf>),
    While(While<'buf>),
    Return(Return<'buf>),
    Break(Jump<'buf>),
    Continue(Jump<'buf>),
    Expr(ExprStmt<'buf>),
}

impl_has_span!(&self: Stmt<'_> => match self {
    Self::VarDef(stmt) => stmt.span(),
    Self::FuncDef(stmt) => stmt.span(),
    Self::Label(stmt) => stmt.span(),
    Self::If(stmt) => stmt.span(),
    Self::While(stmt) => stmt.span(),
    Self::Return(stmt) => stmt.span(),
    Self::Break(stmt) => stmt.span(),
    Self::Continue(stmt) => stmt.span(),
    Self::Expr(stmt) => stmt.span(),
});

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct VarDef<'buf> {
    pub decl: VarDecl<'buf>,
    pub init: Option<Box<Expr<'buf>>>,
    pub span: Span,
}

impl_has_span!(VarDef<'_>);

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FuncDef<'buf> {
    /// The return type and the function name.
    pub decl: VarDecl<'buf>,
    pub params: Vec<VarDecl<'buf>>,
    pub body: Vec<Stmt<'buf>>,
    pub span: Span,
}

impl_has_span!(FuncDef<'_>);

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LabelStmt<'buf> {
    pub label: Name<'buf>,
}

impl_has_span!(&self: LabelStmt<'_> => self.label.span());

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct If<'buf> {
    pub condition: Box<Expr<'buf>>,
    pub body: Vec<Stmt<'buf>>,
    pub else_ifs: Vec<ElseIf<'buf>>,
    pub alternative: Option<Else<'buf>>,
    pub span: Span,
}

impl_has_span!(If<'_>);

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ElseIf<'buf> {
    pub condition: Box<Expr<'buf>>,
    pub body: Vec<Stmt<'buf>>,
    pub span: Span,
}

impl_has_span!(ElseIf<'_>);

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Else<'buf> {
    pub body: Vec<Stmt<'buf>>,
    pub span: Span,
}

impl_has_span!(Else<'_>);

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct While<'buf> {
    pub condition: Box<Expr<'buf>>,
    pub body: Vec<Stmt<'buf>>,
    pub span: Span,
}

impl_has_span!(While<'_>);

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Return<'buf> {
    pub value: Option<Box<Expr<'buf>>>,
    pub span: Span,
}

impl_has_span!(Return<'_>);

/// A `break` or `continue` statement.
///
/// The label is not checked against the enclosing loops.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Jump<'buf> {
    pub label: Option<Name<'buf>>,
    pub span: Span,
}

impl_has_span!(Jump<'_>);

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ExprStmt<'buf> {
    pub expr: Box<Expr<'buf>>,
    pub span: Span,
}

impl_has_span!(ExprStmt<'_>);

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum Expr<'buf> {
    Assignment(Assignment<'buf>),
    BinOp(BinOpExpr<'buf>),
    UnOp(UnOpExpr<'buf>),
    Call(Call<'buf>),
    Index(Index<'buf>),
    Group(Group<'buf>),
    Name(NameExpr<'buf>),
    Int(IntLit),
    Real(RealLit),
    String(StringLit<'buf>),
    Bool(BoolLit),
}

impl_has_span!(&self: Expr<'_> => match self {
    Self::Assignment(expr) => expr.span(),
    Self::BinOp(expr) => expr.span(),
    Self::UnOp(expr) => expr.span(),
    Self::Call(expr) => expr.span(),
    Self::Index(expr) => expr.span(),
    Self::Group(expr) => expr.span(),
    Self::Name(expr) => expr.span(),
    Self::Int(expr) => expr.span(),
    Self::Real(expr) => expr.span(),
    Self::String(expr) => expr.span(),
    Self::Bool(expr) => expr.span(),
});

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Assignment<'buf> {
    pub op: AssignOpKind,
    pub lhs: Box<Expr<'buf>>,
    pub rhs: Box<Expr<'buf>>,
    pub span: Span,
}

impl_has_span!(Assignment<'_>);

define_symbol_kind!(AssignOpKind {
    Assign => Assign,
    Add => AddAssign,
    Subtract => SubAssign,
    Multiply => MulAssign,
    Divide => DivAssign,
    Remainder => RemAssign,
    Power => PowAssign,
});

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BinOpExpr<'buf> {
    pub op: BinOpKind,
    pub lhs: Box<Expr<'buf>>,
    pub rhs: Box<Expr<'buf>>,
    pub span: Span,
}

impl_has_span!(BinOpExpr<'_>);

define_symbol_kind!(BinOpKind {
    Add => Add,
    Subtract => Sub,
    Multiply => Mul,
    Divide => Div,
    Remainder => Rem,
    Power => Pow,
    Equals => Eq,
    NotEquals => Ne,
    Less => Lt,
    LessEquals => Le,
    Greater => Gt,
    GreaterEquals => Ge,
    And => And,
    Or => Or,
});

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UnOpExpr<'buf> {
    pub op: UnOpKind,
    pub expr: Box<Expr<'buf>>,
    pub span: Span,
}

impl_has_span!(UnOpExpr<'_>);

define_symbol_kind!(UnOpKind {
    Negate => Sub,
    Not => Not,
});

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Call<'buf> {
    pub callee: Name<'buf>,
    pub args: Vec<Expr<'buf>>,
    pub span: Span,
}

impl_has_span!(Call<'_>);

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Index<'buf> {
    pub name: Name<'buf>,
    pub index: Box<Expr<'buf>>,
    pub span: Span,
}

impl_has_span!(Index<'_>);

/// A parenthesized expression.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Group<'buf> {
    pub expr: Box<Expr<'buf>>,
    pub span: Span,
}

impl_has_span!(Group<'_>);

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NameExpr<'buf>(pub Name<'buf>);

impl_has_span!(&self: NameExpr<'_> => self.0.span());

#[derive(Serialize, Debug, Clone, Eq, PartialEq, Hash)]
pub struct IntLit(pub Spanned<i64>);

impl_has_span!(|&self: IntLit| &self.0.span);

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RealLit(pub Spanned<f64>);

impl_has_span!(|&self: RealLit| &self.0.span);

#[derive(Serialize, Clone, Eq, PartialEq, Hash)]
pub struct StringLit<'buf>(pub Spanned<Cow<'buf, [u8]>>);

impl fmt::Debug for StringLit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringLit")
            .field("span", &self.0.span)
            .field("value", &ByteStr::new(&self.0.value))
            .finish()
    }
}

impl_has_span!(|&self: StringLit<'_>| &self.0.span);

#[derive(Serialize, Debug, Clone, Eq, PartialEq, Hash)]
pub struct BoolLit(pub Spanned<bool>);

impl_has_span!(|&self: BoolLit| &self.0.span);
