//! Textual dumps of the syntax tree.

use std::fmt::{self, Display};
use std::io::{self, Write};

use serde::Serialize;

use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AstDumpFormat {
    Sexpr,
    Debug,
    Ron,
}

pub fn dump_ast(format: AstDumpFormat, ast: &Program<'_>, mut out: impl Write) -> io::Result<()> {
    match format {
        AstDumpFormat::Sexpr => write!(out, "{}", Sexpr(ast)),
        AstDumpFormat::Debug => writeln!(out, "{:#?}", ast),
        AstDumpFormat::Ron => writeln!(out, "{}", to_ron(ast)?),
    }
}

pub fn to_ron(value: &impl Serialize) -> io::Result<String> {
    ron::ser::to_string_pretty(value, Default::default())
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}

/// Formats a node as an S-expression, e.g. `(= a (+ b 1))`.
pub struct Sexpr<'a, T: ?Sized>(pub &'a T);

impl Display for Sexpr<'_, Program<'_>> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.0.body {
            writeln!(f, "{}", Sexpr(stmt))?;
        }

        Ok(())
    }
}

impl Display for Sexpr<'_, Stmt<'_>> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_stmt(f, self.0)
    }
}

impl Display for Sexpr<'_, Expr<'_>> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_expr(f, self.0)
    }
}

fn write_body(f: &mut fmt::Formatter<'_>, body: &[Stmt<'_>]) -> fmt::Result {
    for stmt in body {
        write!(f, " ")?;
        write_stmt(f, stmt)?;
    }

    Ok(())
}

fn write_decl(f: &mut fmt::Formatter<'_>, decl: &VarDecl<'_>) -> fmt::Result {
    write!(f, "({}", decl.ty.symbol())?;

    if decl.mutable {
        write!(f, " mut")?;
    }

    if decl.reference {
        write!(f, " ref")?;
    }

    write!(f, " {})", decl.name)
}

fn write_stmt(f: &mut fmt::Formatter<'_>, stmt: &Stmt<'_>) -> fmt::Result {
    match stmt {
        Stmt::VarDef(VarDef { decl, init, .. }) => {
            write!(f, "(var ")?;
            write_decl(f, decl)?;

            if let Some(init) = init {
                write!(f, " ")?;
                write_expr(f, init)?;
            }

            write!(f, ")")
        }

        Stmt::FuncDef(FuncDef {
            decl, params, body, ..
        }) => {
            write!(f, "(func ")?;
            write_decl(f, decl)?;
            write!(f, " (")?;

            for (i, param) in params.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }

                write_decl(f, param)?;
            }

            write!(f, ")")?;
            write_body(f, body)?;
            write!(f, ")")
        }

        Stmt::Label(LabelStmt { label }) => write!(f, "(label {})", label),

        Stmt::If(If {
            condition,
            body,
            else_ifs,
            alternative,
            ..
        }) => {
            write!(f, "(if ")?;
            write_expr(f, condition)?;
            write!(f, " (then")?;
            write_body(f, body)?;
            write!(f, ")")?;

            for ElseIf { condition, body, .. } in else_ifs {
                write!(f, " (elseif ")?;
                write_expr(f, condition)?;
                write_body(f, body)?;
                write!(f, ")")?;
            }

            if let Some(Else { body, .. }) = alternative {
                write!(f, " (else")?;
                write_body(f, body)?;
                write!(f, ")")?;
            }

            write!(f, ")")
        }

        Stmt::While(While {
            condition, body, ..
        }) => {
            write!(f, "(while ")?;
            write_expr(f, condition)?;
            write_body(f, body)?;
            write!(f, ")")
        }

        Stmt::Return(Return { value: None, .. }) => write!(f, "(return)"),

        Stmt::Return(Return {
            value: Some(value), ..
        }) => {
            write!(f, "(return ")?;
            write_expr(f, value)?;
            write!(f, ")")
        }

        Stmt::Break(Jump { label, .. }) | Stmt::Continue(Jump { label, .. }) => {
            let keyword = match stmt {
                Stmt::Break(_) => "break",
                _ => "continue",
            };

            match label {
                Some(label) => write!(f, "({} {})", keyword, label),
                None => write!(f, "({})", keyword),
            }
        }

        Stmt::Expr(ExprStmt { expr, .. }) => write_expr(f, expr),
    }
}

fn write_expr(f: &mut fmt::Formatter<'_>, expr: &Expr<'_>) -> fmt::Result {
    match expr {
        Expr::Assignment(Assignment { op, lhs, rhs, .. }) => {
            write!(f, "({} ", op.symbol())?;
            write_expr(f, lhs)?;
            write!(f, " ")?;
            write_expr(f, rhs)?;
            write!(f, ")")
        }

        Expr::BinOp(BinOpExpr { op, lhs, rhs, .. }) => {
            write!(f, "({} ", op.symbol())?;
            write_expr(f, lhs)?;
            write!(f, " ")?;
            write_expr(f, rhs)?;
            write!(f, ")")
        }

        Expr::UnOp(UnOpExpr { op, expr, .. }) => {
            match op {
                UnOpKind::Negate => write!(f, "(neg ")?,
                UnOpKind::Not => write!(f, "(not ")?,
            }

            write_expr(f, expr)?;
            write!(f, ")")
        }

        Expr::Call(Call { callee, args, .. }) => {
            write!(f, "(call {}", callee)?;

            for arg in args {
                write!(f, " ")?;
                write_expr(f, arg)?;
            }

            write!(f, ")")
        }

        Expr::Index(Index { name, index, .. }) => {
            write!(f, "(index {} ", name)?;
            write_expr(f, index)?;
            write!(f, ")")
        }

        Expr::Group(Group { expr, .. }) => {
            write!(f, "(group ")?;
            write_expr(f, expr)?;
            write!(f, ")")
        }

        Expr::Name(NameExpr(name)) => write!(f, "{}", name),
        Expr::Int(IntLit(value)) => write!(f, "{}", value.value),
        Expr::Real(RealLit(value)) => write!(f, "{:?}", value.value),
        Expr::Bool(BoolLit(value)) => write!(f, "{}", value.value),

        Expr::String(StringLit(value)) => {
            let mut buf = Vec::new();

            crate::parse::token::write_escaped_string(&value.value, &mut buf)
                .map_err(|_| fmt::Error)?;

            write!(f, "{}", String::from_utf8_lossy(&buf))
        }
    }
}
