//! Mapping bytecode instruction set.
//!
//! Every instruction is two bytes: the opcode and a one-byte argument.
//! Instructions without an argument carry zero. Jump arguments are
//! distances in instructions, counted from the instruction after the jump:
//! forward for `JMP_F`/`JMP_FF`, backward for `JMP_B`.

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum Opcode {
    // General
    Const = 0x00,
    Store = 0x01,
    Load = 0x02,
    Kind = 0x03,
    Attr = 0x04,
    KindOf = 0x05,
    Iter = 0x06,
    List = 0x07,
    Append = 0x08,
    Drop = 0x09,
    Fail = 0x0A,

    // Operators
    Add = 0x10,
    Sub = 0x11,
    Mul = 0x12,
    Div = 0x13,
    And = 0x15,
    Or = 0x16,
    Neg = 0x17,
    Not = 0x18,
    Eql = 0x19,
    Neq = 0x1A,
    Les = 0x1B,
    Leq = 0x1C,
    Gre = 0x1D,
    Geq = 0x1E,
    Mut = 0x1F,
    Pow = 0x20,

    // Constants
    True = 0x30,
    False = 0x31,
    Int = 0x32,
    Float = 0x33,
    None = 0x34,

    // Jumps
    JmpF = 0x40,
    JmpFf = 0x41,
    JmpB = 0x42,

    // Iterators
    Next = 0x50,
    HasNext = 0x51,
    Range = 0x52,
}

impl Opcode {
    const TABLE: [Opcode; 38] = [
        Opcode::Const,
        Opcode::Store,
        Opcode::Load,
        Opcode::Kind,
        Opcode::Attr,
        Opcode::KindOf,
        Opcode::Iter,
        Opcode::List,
        Opcode::Append,
        Opcode::Drop,
        Opcode::Fail,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::And,
        Opcode::Or,
        Opcode::Neg,
        Opcode::Not,
        Opcode::Eql,
        Opcode::Neq,
        Opcode::Les,
        Opcode::Leq,
        Opcode::Gre,
        Opcode::Geq,
        Opcode::Mut,
        Opcode::Pow,
        Opcode::True,
        Opcode::False,
        Opcode::Int,
        Opcode::Float,
        Opcode::None,
        Opcode::JmpF,
        Opcode::JmpFf,
        Opcode::JmpB,
        Opcode::Next,
        Opcode::HasNext,
        Opcode::Range,
    ];

    #[inline]
    pub const fn byte(self) -> u8 {
        self as u8
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::TABLE.into_iter().find(|op| op.byte() == byte)
    }

    /// Unconditional or conditional forward jump.
    #[inline]
    pub const fn is_forward_jump(self) -> bool {
        matches!(self, Opcode::JmpF | Opcode::JmpFf)
    }

    #[inline]
    pub const fn is_jump(self) -> bool {
        matches!(self, Opcode::JmpF | Opcode::JmpFf | Opcode::JmpB)
    }

    pub const fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Const => "CONST",
            Opcode::Store => "STORE",
            Opcode::Load => "LOAD",
            Opcode::Kind => "KIND",
            Opcode::Attr => "ATTR",
            Opcode::KindOf => "KIND_OF",
            Opcode::Iter => "ITER",
            Opcode::List => "LIST",
            Opcode::Append => "APPEND",
            Opcode::Drop => "DROP",
            Opcode::Fail => "FAIL",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Neg => "NEG",
            Opcode::Not => "NOT",
            Opcode::Eql => "EQL",
            Opcode::Neq => "NEQ",
            Opcode::Les => "LES",
            Opcode::Leq => "LEQ",
            Opcode::Gre => "GRE",
            Opcode::Geq => "GEQ",
            Opcode::Mut => "MUT",
            Opcode::Pow => "POW",
            Opcode::True => "TRUE",
            Opcode::False => "FALSE",
            Opcode::Int => "INT",
            Opcode::Float => "FLOAT",
            Opcode::None => "NONE",
            Opcode::JmpF => "JMP_F",
            Opcode::JmpFf => "JMP_FF",
            Opcode::JmpB => "JMP_B",
            Opcode::Next => "NEXT",
            Opcode::HasNext => "HAS_NEXT",
            Opcode::Range => "RANGE",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
