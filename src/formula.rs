// Derived-column formula parser
//
// Grammar:
//   expr   := term (('+' | '-') term)*
//   term   := factor (('*' | '/') factor)*
//   factor := '-' factor | '(' expr ')' | column | number

use std::collections::BTreeSet;

use nom::{
    branch::alt,
    bytes::complete::take_while,
    character::complete::{char, multispace0, one_of, satisfy},
    combinator::{eof, map, recognize},
    multi::many0,
    number::complete::double,
    sequence::{delimited, pair, preceded},
    IResult,
};

use crate::error::{AtlasError, AtlasResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(String),
    Number(f64),
    Neg(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Evaluate against a column lookup. Any absent operand makes the whole result absent.
    pub fn eval<F>(&self, lookup: &F) -> Option<f64>
    where
        F: Fn(&str) -> Option<f64>,
    {
        match self {
            Expr::Column(name) => lookup(name),
            Expr::Number(v) => Some(*v).filter(|v| v.is_finite()),
            Expr::Neg(inner) => inner.eval(lookup).map(|v| -v),
            Expr::Binary(op, lhs, rhs) => {
                let a = lhs.eval(lookup)?;
                let b = rhs.eval(lookup)?;
                let v = match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                };
                Some(v).filter(|v| v.is_finite())
            }
        }
    }

    /// Column names referenced anywhere in the expression.
    pub fn operands(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_operands(&mut out);
        out
    }

    fn collect_operands(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Column(name) => {
                out.insert(name.clone());
            }
            Expr::Number(_) => {}
            Expr::Neg(inner) => inner.collect_operands(out),
            Expr::Binary(_, lhs, rhs) => {
                lhs.collect_operands(out);
                rhs.collect_operands(out);
            }
        }
    }
}

/// A named derived column, e.g. `DERIV_energy_price_gap_PC = CMPY_ECAP5_PC - CMPY_EG5_PC`.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedColumn {
    pub name: String,
    pub expr: Expr,
}

impl DerivedColumn {
    pub fn parse(name: &str, formula: &str) -> AtlasResult<Self> {
        match parse_formula(formula) {
            Ok((_, expr)) => Ok(Self {
                name: name.to_string(),
                expr,
            }),
            Err(e) => Err(AtlasError::Formula {
                name: name.to_string(),
                message: format!("cannot parse '{}': {:?}", formula, e),
            }),
        }
    }

    pub fn operands(&self) -> BTreeSet<String> {
        self.expr.operands()
    }
}

fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn identifier(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            satisfy(|c: char| c.is_ascii_alphabetic() || c == '_'),
            take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        )),
        |s: &str| s.to_string(),
    )(input)
}

fn factor(input: &str) -> IResult<&str, Expr> {
    ws(alt((
        map(preceded(char('-'), factor), |e| Expr::Neg(Box::new(e))),
        delimited(char('('), expr, char(')')),
        // Identifiers before numbers: `double` would otherwise accept "inf"/"nan" prefixes.
        map(identifier, Expr::Column),
        map(double, Expr::Number),
    )))(input)
}

fn term(input: &str) -> IResult<&str, Expr> {
    let (input, first) = factor(input)?;
    let (input, rest) = many0(pair(ws(one_of("*/")), factor))(input)?;
    Ok((input, fold_binary(first, rest)))
}

fn expr(input: &str) -> IResult<&str, Expr> {
    let (input, first) = term(input)?;
    let (input, rest) = many0(pair(ws(one_of("+-")), term))(input)?;
    Ok((input, fold_binary(first, rest)))
}

fn fold_binary(first: Expr, rest: Vec<(char, Expr)>) -> Expr {
    rest.into_iter().fold(first, |acc, (op, rhs)| {
        let op = match op {
            '+' => BinaryOp::Add,
            '-' => BinaryOp::Sub,
            '*' => BinaryOp::Mul,
            _ => BinaryOp::Div,
        };
        Expr::Binary(op, Box::new(acc), Box::new(rhs))
    })
}

/// Parse a complete formula; trailing input is an error.
pub fn parse_formula(input: &str) -> IResult<&str, Expr> {
    let (input, e) = expr(input)?;
    let (input, _) = ws(eof)(input)?;
    Ok((input, e))
}
