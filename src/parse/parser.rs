use std::borrow::Cow;
use std::error::Error;
use std::fmt::{self, Display};
use std::mem;
use std::ops::{Deref, DerefMut};

use itertools::Itertools;
use serde::Serialize;
use tracing::{instrument, trace};

use crate::ast::{self, AssignOpKind, BinOpKind, Expr, Name, Stmt, TyKind, UnOpKind};
use crate::parse::lexer::{Lexer, LexerError};
use crate::parse::token::{Symbol, Token, TokenType, TokenValue};
use crate::position::{HasSpan, Position, Span, Spanned};
use crate::util::CloneStatic;

/// The number of nested productions the parser may enter. Every production that can recurse
/// costs one level.
const RECURSION_LIMIT: usize = 256;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum ParserError<'buf> {
    UnexpectedToken {
        expected: Cow<'static, [TokenType]>,
        actual: Token<'buf>,
    },

    IntegerTooLarge(Token<'buf>),
    DuplicateModifier(Token<'buf>),

    RecursionLimit(Span),

    LexerError(LexerError),
}

impl From<LexerError> for ParserError<'_> {
    fn from(e: LexerError) -> Self {
        Self::LexerError(e)
    }
}

impl ParserError<'_> {
    /// For an unexpected token, returns the human-readable names of the expected token kinds.
    pub fn expected(&self) -> Option<Vec<String>> {
        match self {
            Self::UnexpectedToken { expected, .. } => {
                Some(expected.iter().map(ToString::to_string).collect())
            }

            _ => None,
        }
    }
}

impl Display for ParserError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken { expected, actual } => {
                match expected.len() {
                    0 => write!(f, "unexpected token")?,
                    1 => write!(f, "expected {}", &expected[0])?,
                    2 => write!(f, "expected {} or {}", &expected[0], &expected[1])?,

                    _ => {
                        write!(f, "expected ")?;

                        for ty in expected.iter().take(expected.len() - 1) {
                            write!(f, "{}, ", ty)?;
                        }

                        write!(f, "or {}", &expected[expected.len() - 1])?;
                    }
                }

                write!(f, ", found {}", actual.ty())
            }

            Self::IntegerTooLarge(token) => write!(
                f,
                "the integer literal {} is too large",
                String::from_utf8_lossy(token.lexeme())
            ),

            Self::DuplicateModifier(token) => {
                write!(f, "the modifier {} is specified more than once", token.ty())
            }

            Self::RecursionLimit(_) => {
                write!(f, "a recursion limit has been reached while parsing")
            }

            Self::LexerError(err) => write!(f, "{}", err),
        }
    }
}

impl Error for ParserError<'_> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::LexerError(err) => Some(err),
            _ => None,
        }
    }
}

impl CloneStatic<ParserError<'static>> for ParserError<'_> {
    fn clone_static(&self) -> ParserError<'static> {
        match self {
            Self::UnexpectedToken { expected, actual } => ParserError::UnexpectedToken {
                expected: expected.clone(),
                actual: actual.clone_static(),
            },

            Self::IntegerTooLarge(token) => ParserError::IntegerTooLarge(token.clone_static()),
            Self::DuplicateModifier(token) => ParserError::DuplicateModifier(token.clone_static()),
            Self::RecursionLimit(span) => ParserError::RecursionLimit(span.clone()),
            Self::LexerError(e) => ParserError::LexerError(e.clone()),
        }
    }
}

impl HasSpan for ParserError<'_> {
    fn span(&self) -> Cow<'_, Span> {
        match self {
            Self::UnexpectedToken { actual, .. } => actual.span(),
            Self::IntegerTooLarge(token) => token.span(),
            Self::DuplicateModifier(token) => token.span(),
            Self::RecursionLimit(span) => Cow::Borrowed(span),
            Self::LexerError(e) => e.span(),
        }
    }
}

trait Matcher {
    fn matches(&self, ty: TokenType) -> bool;

    fn expected_tokens(&self) -> Cow<'static, [TokenType]>;
}

impl<const N: usize> Matcher for &[Symbol; N] {
    fn matches(&self, ty: TokenType) -> bool {
        match ty {
            TokenType::Symbol(sym) => self.contains(&sym),
            _ => false,
        }
    }

    fn expected_tokens(&self) -> Cow<'static, [TokenType]> {
        self.iter().copied().map(TokenType::Symbol).collect()
    }
}

impl Matcher for TokenType {
    fn matches(&self, ty: TokenType) -> bool {
        *self == ty
    }

    fn expected_tokens(&self) -> Cow<'static, [TokenType]> {
        vec![*self].into()
    }
}

impl Matcher for Symbol {
    fn matches(&self, ty: TokenType) -> bool {
        TokenType::Symbol(*self) == ty
    }

    fn expected_tokens(&self) -> Cow<'static, [TokenType]> {
        vec![TokenType::Symbol(*self)].into()
    }
}

const TY_SYMBOLS: [Symbol; 5] = [
    Symbol::Void,
    Symbol::Bool,
    Symbol::Int,
    Symbol::Real,
    Symbol::String,
];

macro_rules! select {
    ($self:ident : { $( $matcher:expr => $arm:expr, )+ _ => $default:expr }) => ({
        let ty = $self.current()?.ty();

        match ty {
            $( ty if $matcher.matches(ty) => $arm, )+
            _ => $default,
        }
    });

    ($self:ident : { $( $matcher:expr => $arm:expr, )+ _ => @error, }) => ({
        select!($self: { $( $matcher => $arm, )+ _ => {
            let expected: Vec<TokenType> = [$( $matcher.expected_tokens().iter().copied().collect::<Vec<_>>(), )+]
                .into_iter()
                .flatten()
                .unique()
                .collect();

            return Err(ParserError::UnexpectedToken {
                expected: expected.into(),
                actual: $self.current()?.clone(),
            });
        }})
    });
}

fn format_expected(tokens: Cow<'static, [TokenType]>) -> String {
    tokens.iter().map(|token| format!("{}", token)).join(", ")
}

struct BoundedParser<'buf, 'a> {
    parser: &'a mut Parser<'buf>,
    prev_layer_start: Position,
}

impl Drop for BoundedParser<'_, '_> {
    fn drop(&mut self) {
        self.parser.recursion_limit += 1;
        self.parser.layer_start = self.prev_layer_start;
    }
}

impl<'buf> Deref for BoundedParser<'buf, '_> {
    type Target = Parser<'buf>;

    fn deref(&self) -> &Parser<'buf> {
        self.parser
    }
}

impl<'buf> DerefMut for BoundedParser<'buf, '_> {
    fn deref_mut(&mut self) -> &mut Parser<'buf> {
        self.parser
    }
}

/// A recursive-descent parser with one token of lookahead.
pub struct Parser<'buf> {
    lexer: Lexer<'buf>,
    current: Option<Token<'buf>>,
    recursion_limit: usize,
    layer_start: Position,
}

impl<'buf> Parser<'buf> {
    pub fn new(lexer: Lexer<'buf>) -> Self {
        let layer_start = lexer.pos();

        Self {
            lexer,
            current: None,
            recursion_limit: RECURSION_LIMIT,
            layer_start,
        }
    }

    fn bounded(&mut self) -> Result<BoundedParser<'buf, '_>, ParserError<'buf>> {
        let next_pos = self.next_pos();

        self.recursion_limit =
            self.recursion_limit
                .checked_sub(1)
                .ok_or(ParserError::RecursionLimit(Span {
                    start: self.layer_start,
                    end: next_pos,
                }))?;

        let prev_layer_start = mem::replace(&mut self.layer_start, next_pos);

        Ok(BoundedParser {
            parser: self,
            prev_layer_start,
        })
    }

    fn next_pos(&self) -> Position {
        match &self.current {
            Some(token) => token.span.start,
            None => self.lexer.pos(),
        }
    }

    /// Returns the lookahead token, scanning it if necessary.
    fn current(&mut self) -> Result<&Token<'buf>, ParserError<'buf>> {
        let token = match self.current.take() {
            Some(token) => token,
            None => self.lexer.next_token()?,
        };

        Ok(self.current.insert(token))
    }

    /// Consumes the lookahead token.
    fn advance(&mut self) -> Result<Token<'buf>, ParserError<'buf>> {
        match self.current.take() {
            Some(token) => Ok(token),
            None => Ok(self.lexer.next_token()?),
        }
    }

    fn matches(&mut self, matcher: impl Matcher) -> Result<bool, ParserError<'buf>> {
        Ok(matcher.matches(self.current()?.ty()))
    }

    #[instrument(
        level = "trace",
        ret,
        skip(self, matcher),
        fields(matcher = format_expected(matcher.expected_tokens()))
    )]
    fn expect(&mut self, matcher: impl Matcher) -> Result<Token<'buf>, ParserError<'buf>> {
        let token = self.current()?;
        trace!(?token);

        if matcher.matches(token.ty()) {
            self.advance()
        } else {
            Err(ParserError::UnexpectedToken {
                expected: matcher.expected_tokens(),
                actual: token.clone(),
            })
        }
    }

    #[instrument(
        level = "trace",
        ret,
        skip(self, matcher),
        fields(matcher = format_expected(matcher.expected_tokens()))
    )]
    fn try_consume(
        &mut self,
        matcher: impl Matcher,
    ) -> Result<Option<Token<'buf>>, ParserError<'buf>> {
        if self.matches(matcher)? {
            self.advance().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Parses the whole input as a sequence of statements.
    #[instrument(level = "trace", skip(self), ret)]
    pub fn parse(mut self) -> Result<ast::Program<'buf>, ParserError<'buf>> {
        let start = self.current()?.span.start;
        let mut body = Vec::new();

        while let Some(stmt) = self.next_stmt()? {
            body.push(stmt);
        }

        let end = self.current()?.span.end;

        Ok(ast::Program {
            body,
            span: Span { start, end },
        })
    }

    /// Parses the next statement, or returns `None` at the end of the input.
    pub fn next_stmt(&mut self) -> Result<Option<Stmt<'buf>>, ParserError<'buf>> {
        if self.matches(TokenType::Eof)? {
            Ok(None)
        } else {
            self.parse_stmt().map(Some)
        }
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_stmt(&mut self) -> Result<Stmt<'buf>, ParserError<'buf>> {
        select!(self: {
            Symbol::If => self.bounded()?.parse_if(),
            Symbol::While => self.bounded()?.parse_while(),
            Symbol::Return => self.bounded()?.parse_return(),
            Symbol::Break => self.bounded()?.parse_jump(Symbol::Break),
            Symbol::Continue => self.bounded()?.parse_jump(Symbol::Continue),
            &TY_SYMBOLS => self.bounded()?.parse_definition(),
            TokenType::Label => self.parse_label(),
            _ => self.bounded()?.parse_expr_stmt()
        })
    }

    /// Parses statements until the lookahead is one of `terminators` (which is left unconsumed).
    fn parse_body<const N: usize>(
        &mut self,
        terminators: &[Symbol; N],
    ) -> Result<Vec<Stmt<'buf>>, ParserError<'buf>> {
        let mut parser = self.bounded()?;
        let mut body = Vec::new();

        while !parser.matches(terminators)? {
            body.push(parser.bounded()?.parse_stmt()?);
        }

        Ok(body)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_if(&mut self) -> Result<Stmt<'buf>, ParserError<'buf>> {
        const TERMINATORS: [Symbol; 3] = [Symbol::ElseIf, Symbol::Else, Symbol::End];

        let r#if = self.expect(Symbol::If)?;
        let condition = self.parse_expr()?;
        self.expect(Symbol::Then)?;
        let body = self.parse_body(&TERMINATORS)?;

        let mut else_ifs = Vec::new();

        while let Some(else_if) = self.try_consume(Symbol::ElseIf)? {
            let condition = self.parse_expr()?;
            self.expect(Symbol::Then)?;
            let body = self.parse_body(&TERMINATORS)?;
            let span = else_if.span.convex_hull(&self.prev_span(&body, &condition));

            else_ifs.push(ast::ElseIf {
                condition,
                body,
                span,
            });
        }

        let alternative = match self.try_consume(Symbol::Else)? {
            Some(r#else) => {
                let body = self.parse_body(&[Symbol::End])?;
                let span = match body.last() {
                    Some(stmt) => r#else.span.convex_hull(&stmt.span()),
                    None => r#else.span,
                };

                Some(ast::Else { body, span })
            }

            None => None,
        };

        let end = self.expect(Symbol::End)?;
        let span = r#if.span.convex_hull(&end.span);

        Ok(Stmt::If(ast::If {
            condition,
            body,
            else_ifs,
            alternative,
            span,
        }))
    }

    fn prev_span(&self, body: &[Stmt<'buf>], condition: &Expr<'buf>) -> Span {
        match body.last() {
            Some(stmt) => stmt.span().into_owned(),
            None => condition.span().into_owned(),
        }
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_while(&mut self) -> Result<Stmt<'buf>, ParserError<'buf>> {
        let r#while = self.expect(Symbol::While)?;
        let condition = self.parse_expr()?;
        self.expect(Symbol::Do)?;
        let body = self.parse_body(&[Symbol::End])?;
        let end = self.expect(Symbol::End)?;

        let span = r#while.span.convex_hull(&end.span);

        Ok(Stmt::While(ast::While {
            condition,
            body,
            span,
        }))
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_return(&mut self) -> Result<Stmt<'buf>, ParserError<'buf>> {
        let r#return = self.expect(Symbol::Return)?;

        let value = if self.matches(Symbol::Semicolon)? {
            None
        } else {
            Some(self.parse_expr()?)
        };

        let semicolon = self.expect(Symbol::Semicolon)?;
        let span = r#return.span.convex_hull(&semicolon.span);

        Ok(Stmt::Return(ast::Return { value, span }))
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_jump(&mut self, keyword: Symbol) -> Result<Stmt<'buf>, ParserError<'buf>> {
        let jump = self.expect(keyword)?;

        let label = match self.try_consume(TokenType::Ident)? {
            Some(token) => Some(Self::make_name(token)),
            None => None,
        };

        let semicolon = self.expect(Symbol::Semicolon)?;
        let span = jump.span.convex_hull(&semicolon.span);
        let jump = ast::Jump { label, span };

        Ok(match keyword {
            Symbol::Break => Stmt::Break(jump),
            _ => Stmt::Continue(jump),
        })
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_label(&mut self) -> Result<Stmt<'buf>, ParserError<'buf>> {
        let label = self.expect(TokenType::Label)?;

        Ok(Stmt::Label(ast::LabelStmt {
            label: Self::make_name(label),
        }))
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_definition(&mut self) -> Result<Stmt<'buf>, ParserError<'buf>> {
        let decl = self.parse_decl()?;

        if self.matches(Symbol::ParenLeft)? {
            return self.bounded()?.parse_func_def(decl);
        }

        let init = match self.try_consume(Symbol::Assign)? {
            Some(_) => Some(self.parse_expr()?),
            None => None,
        };

        let semicolon = self.expect(Symbol::Semicolon)?;
        let span = decl.span.convex_hull(&semicolon.span);

        Ok(Stmt::VarDef(ast::VarDef { decl, init, span }))
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_func_def(&mut self, decl: ast::VarDecl<'buf>) -> Result<Stmt<'buf>, ParserError<'buf>> {
        self.expect(Symbol::ParenLeft)?;
        let mut params = Vec::new();

        loop {
            if self.try_consume(Symbol::ParenRight)?.is_some() {
                break;
            }

            if !params.is_empty() {
                self.expect(Symbol::Delimiter)?;
            }

            params.push(self.parse_decl()?);
        }

        let body = self.parse_body(&[Symbol::End])?;
        let end = self.expect(Symbol::End)?;
        let span = decl.span.convex_hull(&end.span);

        Ok(Stmt::FuncDef(ast::FuncDef {
            decl,
            params,
            body,
            span,
        }))
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_decl(&mut self) -> Result<ast::VarDecl<'buf>, ParserError<'buf>> {
        let ty_token = self.expect(&TY_SYMBOLS)?;
        let ty: TyKind = Self::symbol_kind(&ty_token);

        let mut mutable = false;
        let mut reference = false;

        while let Some(modifier) = self.try_consume(&[Symbol::Mut, Symbol::Ref])? {
            let flag = match modifier.ty() {
                TokenType::Symbol(Symbol::Mut) => &mut mutable,
                _ => &mut reference,
            };

            if mem::replace(flag, true) {
                return Err(ParserError::DuplicateModifier(modifier));
            }
        }

        let name = Self::make_name(self.expect(TokenType::Ident)?);
        let span = ty_token.span.convex_hull(&name.span());

        Ok(ast::VarDecl {
            ty,
            name,
            mutable,
            reference,
            span,
        })
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_expr_stmt(&mut self) -> Result<Stmt<'buf>, ParserError<'buf>> {
        let expr = self.parse_expr()?;
        let semicolon = self.expect(Symbol::Semicolon)?;
        let span = expr.span().convex_hull(&semicolon.span);

        Ok(Stmt::Expr(ast::ExprStmt { expr, span }))
    }

    fn make_name(token: Token<'buf>) -> Name<'buf> {
        let value = match token.value {
            TokenValue::Ident(s) | TokenValue::Label(s) => s,
            value => unreachable!("{:?} is not a name", value),
        };

        Name(Spanned {
            value,
            span: token.span,
        })
    }

    /// Parses a single expression.
    #[instrument(level = "trace", skip(self), ret)]
    pub fn parse_expr(&mut self) -> Result<Box<Expr<'buf>>, ParserError<'buf>> {
        self.bounded()?.parse_expr_assign()
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_expr_assign(&mut self) -> Result<Box<Expr<'buf>>, ParserError<'buf>> {
        const ASSIGN_OPS: [Symbol; 7] = [
            Symbol::Assign,
            Symbol::AddAssign,
            Symbol::SubAssign,
            Symbol::MulAssign,
            Symbol::DivAssign,
            Symbol::RemAssign,
            Symbol::PowAssign,
        ];

        let lhs = self.bounded()?.parse_expr_logical()?;

        let Some(sym) = self.try_consume(&ASSIGN_OPS)? else {
            return Ok(lhs);
        };

        let op: AssignOpKind = Self::symbol_kind(&sym);

        let rhs = self.bounded()?.parse_expr_assign()?;
        let span = lhs.span().convex_hull(&rhs.span());

        Ok(Box::new(Expr::Assignment(ast::Assignment { op, lhs, rhs, span })))
    }

    #[inline(always)]
    fn parse_bin_op_lassoc<D>(
        &mut self,
        matcher: impl Matcher + Copy,
        mut descend: D,
    ) -> Result<Box<Expr<'buf>>, ParserError<'buf>>
    where
        D: FnMut(&mut Self) -> Result<Box<Expr<'buf>>, ParserError<'buf>>,
    {
        let mut lhs = descend(&mut *self.bounded()?)?;

        while let Some(sym) = self.try_consume(matcher)? {
            let op: BinOpKind = Self::symbol_kind(&sym);
            let rhs = descend(&mut *self.bounded()?)?;
            let span = lhs.span().convex_hull(&rhs.span());

            lhs = Box::new(Expr::BinOp(ast::BinOpExpr { op, lhs, rhs, span }));
        }

        Ok(lhs)
    }

    /// Maps a consumed operator or type token to its AST kind.
    ///
    /// The token has already been matched against the kind's symbols, so a mismatch means the
    /// matcher and the kind table disagree.
    fn symbol_kind<K: TryFrom<Symbol>>(token: &Token<'buf>) -> K {
        match token.ty() {
            TokenType::Symbol(sym) => match K::try_from(sym) {
                Ok(kind) => kind,
                Err(_) => unreachable!("{} has no {}", token.ty(), std::any::type_name::<K>()),
            },

            ty => unreachable!("{} is not a symbol", ty),
        }
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_expr_logical(&mut self) -> Result<Box<Expr<'buf>>, ParserError<'buf>> {
        self.parse_bin_op_lassoc(&[Symbol::And, Symbol::Or], Self::parse_expr_relational)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_expr_relational(&mut self) -> Result<Box<Expr<'buf>>, ParserError<'buf>> {
        self.parse_bin_op_lassoc(
            &[
                Symbol::Eq,
                Symbol::Ne,
                Symbol::Lt,
                Symbol::Le,
                Symbol::Gt,
                Symbol::Ge,
            ],
            Self::parse_expr_additive,
        )
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_expr_additive(&mut self) -> Result<Box<Expr<'buf>>, ParserError<'buf>> {
        self.parse_bin_op_lassoc(&[Symbol::Add, Symbol::Sub], Self::parse_expr_multiplicative)
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_expr_multiplicative(&mut self) -> Result<Box<Expr<'buf>>, ParserError<'buf>> {
        self.parse_bin_op_lassoc(
            &[Symbol::Mul, Symbol::Div, Symbol::Rem],
            Self::parse_expr_prefix,
        )
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_expr_prefix(&mut self) -> Result<Box<Expr<'buf>>, ParserError<'buf>> {
        let Some(sym) = self.try_consume(&[Symbol::Sub, Symbol::Not])? else {
            return self.bounded()?.parse_expr_postfix();
        };

        let op: UnOpKind = Self::symbol_kind(&sym);

        let expr = self.bounded()?.parse_expr_postfix()?;
        let span = sym.span.convex_hull(&expr.span());

        Ok(Box::new(Expr::UnOp(ast::UnOpExpr { op, expr, span })))
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_expr_postfix(&mut self) -> Result<Box<Expr<'buf>>, ParserError<'buf>> {
        let lhs = self.bounded()?.parse_expr_primary()?;

        if self.try_consume(Symbol::Pow)?.is_none() {
            return Ok(lhs);
        }

        let rhs = self.bounded()?.parse_expr_postfix()?;
        let span = lhs.span().convex_hull(&rhs.span());

        Ok(Box::new(Expr::BinOp(ast::BinOpExpr {
            op: BinOpKind::Power,
            lhs,
            rhs,
            span,
        })))
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_expr_primary(&mut self) -> Result<Box<Expr<'buf>>, ParserError<'buf>> {
        select!(self: {
            Symbol::ParenLeft => self.bounded()?.parse_group(),
            &[Symbol::True, Symbol::False] => self.parse_bool_lit(),
            TokenType::IntLit => self.parse_int_lit(),
            TokenType::RealLit => self.parse_real_lit(),
            TokenType::StringLit => self.parse_string_lit(),
            TokenType::Ident => self.bounded()?.parse_expr_name(),
            _ => @error,
        })
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_group(&mut self) -> Result<Box<Expr<'buf>>, ParserError<'buf>> {
        let paren_left = self.expect(Symbol::ParenLeft)?;
        let expr = self.parse_expr()?;
        let paren_right = self.expect(Symbol::ParenRight)?;
        let span = paren_left.span.convex_hull(&paren_right.span);

        Ok(Box::new(Expr::Group(ast::Group { expr, span })))
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_expr_name(&mut self) -> Result<Box<Expr<'buf>>, ParserError<'buf>> {
        let name = Self::make_name(self.expect(TokenType::Ident)?);

        select!(self: {
            Symbol::BracketLeft => {
                self.expect(Symbol::BracketLeft)?;
                let index = self.parse_expr()?;
                let bracket_right = self.expect(Symbol::BracketRight)?;
                let span = name.span().convex_hull(&bracket_right.span);

                Ok(Box::new(Expr::Index(ast::Index { name, index, span })))
            },

            Symbol::ParenLeft => self.bounded()?.parse_call(name),

            _ => Ok(Box::new(Expr::Name(ast::NameExpr(name))))
        })
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_call(&mut self, callee: Name<'buf>) -> Result<Box<Expr<'buf>>, ParserError<'buf>> {
        self.expect(Symbol::ParenLeft)?;
        let mut args = Vec::new();

        let paren_right = loop {
            if let Some(paren_right) = self.try_consume(Symbol::ParenRight)? {
                break paren_right;
            }

            if !args.is_empty() {
                self.expect(Symbol::Delimiter)?;
            }

            args.push(*self.parse_expr()?);
        };

        let span = callee.span().convex_hull(&paren_right.span);

        Ok(Box::new(Expr::Call(ast::Call { callee, args, span })))
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_int_lit(&mut self) -> Result<Box<Expr<'buf>>, ParserError<'buf>> {
        let token = self.expect(TokenType::IntLit)?;

        let value = std::str::from_utf8(token.lexeme())
            .ok()
            .and_then(|digits| digits.parse::<i64>().ok());

        match value {
            Some(value) => Ok(Box::new(Expr::Int(ast::IntLit(Spanned {
                value,
                span: token.span,
            })))),

            None => Err(ParserError::IntegerTooLarge(token)),
        }
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_real_lit(&mut self) -> Result<Box<Expr<'buf>>, ParserError<'buf>> {
        let token = self.expect(TokenType::RealLit)?;

        // the lexer only produces `digits.digits`, which always parses
        let value = match std::str::from_utf8(token.lexeme()).map(str::parse::<f64>) {
            Ok(Ok(value)) => value,
            _ => unreachable!("{:?} is not a real literal", token.lexeme()),
        };

        Ok(Box::new(Expr::Real(ast::RealLit(Spanned {
            value,
            span: token.span,
        }))))
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_string_lit(&mut self) -> Result<Box<Expr<'buf>>, ParserError<'buf>> {
        let token = self.expect(TokenType::StringLit)?;

        let value = match token.value {
            TokenValue::StringLit(s) => s,
            value => unreachable!("{:?} is not a string literal", value),
        };

        Ok(Box::new(Expr::String(ast::StringLit(Spanned {
            value,
            span: token.span,
        }))))
    }

    #[instrument(level = "trace", skip(self), ret)]
    fn parse_bool_lit(&mut self) -> Result<Box<Expr<'buf>>, ParserError<'buf>> {
        let token = self.expect(&[Symbol::True, Symbol::False])?;

        Ok(Box::new(Expr::Bool(ast::BoolLit(Spanned {
            value: token.ty() == TokenType::Symbol(Symbol::True),
            span: token.span,
        }))))
    }
}
