use std::fmt;

/// Stage of expression building that reports a code. The first digit of
/// the code names it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Phase {
    Lexing,
    Structure,
    Resolution,
    Internal,
}

macro_rules! error_codes {
    ($($phase:ident { $($code:ident => $title:literal,)* })*) => {
        /// Searchable code carried by every [`crate::Diagnostic`].
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
        pub enum ErrorCode {
            $($(
                #[doc = $title]
                $code,
            )*)*
        }

        impl ErrorCode {
            pub const ALL: &'static [ErrorCode] = &[$($(ErrorCode::$code,)*)*];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($(ErrorCode::$code => stringify!($code),)*)*
                }
            }

            /// One-line summary, as printed by `quill explain`.
            pub fn title(self) -> &'static str {
                match self {
                    $($(ErrorCode::$code => $title,)*)*
                }
            }

            pub fn phase(self) -> Phase {
                match self {
                    $($(ErrorCode::$code => Phase::$phase,)*)*
                }
            }
        }
    };
}

error_codes! {
    Lexing {
        E0001 => "Unterminated string literal",
        E0002 => "Invalid character in formula",
        E0003 => "Malformed number literal",
    }
    Structure {
        E1001 => "Unexpected token",
        E1002 => "Expected an expression",
        E1003 => "Unclosed delimiter",
        E1004 => "Unmatched closing delimiter",
        E1005 => "Operands left without an operator",
        E1006 => "Formula exceeds the configured maximum length",
        E1007 => "Empty formula",
        E1008 => "Too many arguments in one call",
    }
    Resolution {
        E2001 => "Type mismatch",
        E2002 => "Unresolved symbol",
        E2003 => "No overload accepts the operand types",
        E2004 => "Wrong number of arguments",
        E2005 => "Unknown member, method, indexer or constructor",
        E2006 => "Symbol cannot be used in this position",
        E2007 => "Invalid array literal",
        E2008 => "Invalid formal parameter declaration",
    }
    Internal {
        E9001 => "A registered construct panicked while building",
    }
}

impl ErrorCode {
    /// Look a code up by its printed form, e.g. `"E2003"`.
    pub fn parse(text: &str) -> Option<Self> {
        let wanted = text.trim().to_ascii_uppercase();
        Self::ALL.iter().copied().find(|code| code.as_str() == wanted)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
