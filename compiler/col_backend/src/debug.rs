//! Human-readable listings of compiled objects.

use std::fmt::Write;

use crate::emit::fixpoint;
use crate::object::Constant;
use crate::opcode::Opcode;

/// One line per pool entry: `NNN: value`, strings unquoted.
pub fn format_pool(pool: &[Constant]) -> String {
    let mut out = String::new();
    for (idx, constant) in pool.iter().enumerate() {
        let _ = match constant {
            Constant::Number(number) => writeln!(out, "{idx:03}: {number}"),
            Constant::Str(text) => writeln!(out, "{idx:03}: {text}"),
        };
    }
    out
}

/// Disassemble a mapping's byte stream, one instruction per line.
///
/// Jumps are annotated with their absolute target, `= (index)`, and
/// `FLOAT` with the value it encodes.
pub fn format_code(code: &[u8]) -> String {
    let mut out = String::new();
    for (idx, unit) in code.chunks(2).enumerate() {
        let arg = unit.get(1).copied().unwrap_or_default();
        let Some(opcode) = Opcode::from_byte(unit[0]) else {
            let _ = writeln!(out, "{idx:03}: ??? 0x{:02X} {arg:>3}", unit[0]);
            continue;
        };
        let _ = write!(out, "{idx:03}: {:<8} {arg:>3}", opcode.mnemonic());
        if let Some(target) = jump_target(opcode, idx, arg) {
            let _ = write!(out, " = ({target})");
        } else if opcode == Opcode::Float {
            let _ = write!(out, " = {}", fixpoint::decode(arg));
        }
        out.push('\n');
    }
    out
}

fn jump_target(opcode: Opcode, idx: usize, arg: u8) -> Option<usize> {
    let next = idx + 1;
    match opcode {
        Opcode::JmpF | Opcode::JmpFf => Some(next + usize::from(arg)),
        Opcode::JmpB => next.checked_sub(usize::from(arg)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use col_ir::Number;

    #[test]
    fn test_format_pool() {
        let pool = vec![
            Constant::Number(Number::Int(1000)),
            Constant::Str("width".to_string()),
        ];
        assert_eq!(format_pool(&pool), "000: 1000\n001: width\n");
    }

    #[test]
    fn test_format_code() {
        let code = [
            0x51, 1, // HAS_NEXT 1
            0x41, 2, // JMP_FF
            0x50, 1, // NEXT 1
            0x42, 3, // JMP_B
            0x33, 9, // FLOAT 1.125
            0xEE, 7,
        ];
        assert_eq!(
            format_code(&code),
            "000: HAS_NEXT   1\n\
             001: JMP_FF     2 = (4)\n\
             002: NEXT       1\n\
             003: JMP_B      3 = (1)\n\
             004: FLOAT      9 = 1.125\n\
             005: ??? 0xEE   7\n"
        );
    }
}
