use crate::types::XdmType;
use std::fmt;
use thiserror::Error;
use xstore_dom::DomError;

/// Position of an expression in the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

fn located(location: &Option<SourceLocation>) -> String {
    match location {
        Some(loc) => format!(" (at {loc})"),
        None => String::new(),
    }
}

/// What went wrong inside a computable value's own operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticFault {
    DivisionByZero,
    Overflow,
    /// NaN or infinite operand where a finite number is required.
    InvalidOperand,
}

impl ArithmeticFault {
    pub fn code(self) -> &'static str {
        match self {
            ArithmeticFault::DivisionByZero => "FOAR0001",
            ArithmeticFault::Overflow => "FOAR0002",
            ArithmeticFault::InvalidOperand => "FOCA0005",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum XQueryError {
    #[error("[{code}] Type error: {message}{}", located(.location))]
    Type {
        code: &'static str,
        message: String,
        location: Option<SourceLocation>,
    },

    #[error("[{}] Arithmetic error: {message}{}", .fault.code(), located(.location))]
    Arithmetic {
        fault: ArithmeticFault,
        message: String,
        location: Option<SourceLocation>,
    },

    #[error("[FORG0001] Cannot cast '{value}' from {from} to {to}{}", located(.location))]
    InvalidCast {
        from: XdmType,
        to: XdmType,
        value: String,
        location: Option<SourceLocation>,
    },

    #[error(
        "[XPTY0004] Cardinality error: expected {expected}, got {actual} items{}",
        located(.location)
    )]
    Cardinality {
        expected: String,
        actual: usize,
        location: Option<SourceLocation>,
    },

    #[error("Evaluation was cancelled")]
    Cancelled,

    #[error("Document store error: {0}")]
    Dom(#[from] DomError),
}

impl XQueryError {
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::Type {
            code: "XPTY0004",
            message: message.into(),
            location: None,
        }
    }

    /// Effective boolean value is not defined for the operand.
    pub fn ebv_error(message: impl Into<String>) -> Self {
        Self::Type {
            code: "FORG0006",
            message: message.into(),
            location: None,
        }
    }

    pub fn arithmetic(fault: ArithmeticFault, message: impl Into<String>) -> Self {
        Self::Arithmetic {
            fault,
            message: message.into(),
            location: None,
        }
    }

    pub fn division_by_zero() -> Self {
        Self::arithmetic(ArithmeticFault::DivisionByZero, "division by zero")
    }

    pub fn overflow(operation: &str) -> Self {
        Self::arithmetic(ArithmeticFault::Overflow, format!("overflow in {operation}"))
    }

    pub fn invalid_cast(from: XdmType, to: XdmType, value: impl Into<String>) -> Self {
        Self::InvalidCast {
            from,
            to,
            value: value.into(),
            location: None,
        }
    }

    pub fn cardinality(expected: impl Into<String>, actual: usize) -> Self {
        Self::Cardinality {
            expected: expected.into(),
            actual,
            location: None,
        }
    }

    /// Tags the error with the location of the expression that raised it.
    /// A location that is already set is kept.
    pub fn at(mut self, loc: Option<SourceLocation>) -> Self {
        match &mut self {
            Self::Type { location, .. }
            | Self::Arithmetic { location, .. }
            | Self::InvalidCast { location, .. }
            | Self::Cardinality { location, .. } => {
                if location.is_none() {
                    *location = loc;
                }
            }
            _ => {}
        }
        self
    }

    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            Self::Type { location, .. }
            | Self::Arithmetic { location, .. }
            | Self::InvalidCast { location, .. }
            | Self::Cardinality { location, .. } => *location,
            _ => None,
        }
    }

    /// W3C error code of this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Type { code, .. } => *code,
            Self::Arithmetic { fault, .. } => fault.code(),
            Self::InvalidCast { .. } => "FORG0001",
            Self::Cardinality { .. } => "XPTY0004",
            Self::Cancelled | Self::Dom(_) => "FOER0000",
        }
    }
}
