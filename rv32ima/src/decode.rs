//! Pure instruction decoder: a 32-bit word in, `(Op, operands)` or a decode
//! error out. No side effects, no hart state.

use rv32_core::bits::{get, sign_extend};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Op {
    Lb,
    Lh,
    Lw,
    Lbu,
    Lhu,
    Sb,
    Sh,
    Sw,
    Beq,
    Bne,
    Blt,
    Bge,
    Bltu,
    Bgeu,
    Jal,
    Jalr,
    Lui,
    Auipc,
    Fence,
    FenceI,
    Addi,
    Slti,
    Sltiu,
    Xori,
    Ori,
    Andi,
    Slli,
    Srli,
    Srai,
    Add,
    Sub,
    Sll,
    Slt,
    Sltu,
    Xor,
    Srl,
    Sra,
    Or,
    And,
    Mul,
    Mulh,
    Mulhsu,
    Mulhu,
    Div,
    Divu,
    Rem,
    Remu,
    Ecall,
    Ebreak,
    Sret,
    Wfi,
    SfenceVma,
    Csrrw,
    Csrrs,
    Csrrc,
    Csrrwi,
    Csrrsi,
    Csrrci,
    LrW,
    ScW,
    AmoswapW,
    AmoaddW,
    AmoxorW,
    AmoandW,
    AmoorW,
    AmominW,
    AmomaxW,
    AmominuW,
    AmomaxuW,
}

#[derive(Debug, Clone, Copy)]
pub struct Decoded {
    pub op: Op,
    pub rd: u32,
    pub rs1: u32,
    pub rs2: u32,
    /// Sign-extended immediate for formats that have one; for CSR
    /// instructions this is instead the zero-extended 12-bit CSR address,
    /// and for the immediate CSR variants `rs1` doubles as the 5-bit
    /// unsigned immediate.
    pub imm: u32,
}

#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("cannot classify instruction word {word:#010x}")]
pub struct DecodeError {
    pub word: u32,
}

const OPCODE_LOAD: u32 = 0b000_0011;
const OPCODE_FENCE: u32 = 0b000_1111;
const OPCODE_OP_IMM: u32 = 0b001_0011;
const OPCODE_AUIPC: u32 = 0b001_0111;
const OPCODE_STORE: u32 = 0b010_0011;
const OPCODE_AMO: u32 = 0b010_1111;
const OPCODE_OP: u32 = 0b011_0011;
const OPCODE_LUI: u32 = 0b011_0111;
const OPCODE_BRANCH: u32 = 0b110_0011;
const OPCODE_JALR: u32 = 0b110_0111;
const OPCODE_JAL: u32 = 0b110_1111;
const OPCODE_SYSTEM: u32 = 0b111_0011;

/// Classify `word` into an operation plus its raw operand fields.
pub fn decode(word: u32) -> Result<Decoded, DecodeError> {
    let opcode = get(word, 6, 0);
    let rd = get(word, 11, 7);
    let funct3 = get(word, 14, 12);
    let rs1 = get(word, 19, 15);
    let rs2 = get(word, 24, 20);
    let funct7 = get(word, 31, 25);

    let i_imm = sign_extend(get(word, 31, 20), 12);
    let s_imm = sign_extend((get(word, 31, 25) << 5) | get(word, 11, 7), 12);
    let b_imm = sign_extend(
        (get(word, 31, 31) << 12)
            | (get(word, 7, 7) << 11)
            | (get(word, 30, 25) << 5)
            | (get(word, 11, 8) << 1),
        13,
    );
    let u_imm = get(word, 31, 12) << 12;
    let j_imm = sign_extend(
        (get(word, 31, 31) << 20)
            | (get(word, 19, 12) << 12)
            | (get(word, 20, 20) << 11)
            | (get(word, 30, 21) << 1),
        21,
    );

    let err = || DecodeError { word };

    let decoded = match opcode {
        OPCODE_LOAD => {
            let op = match funct3 {
                0b000 => Op::Lb,
                0b001 => Op::Lh,
                0b010 => Op::Lw,
                0b100 => Op::Lbu,
                0b101 => Op::Lhu,
                _ => return Err(err()),
            };
            Decoded { op, rd, rs1, rs2: 0, imm: i_imm }
        }
        OPCODE_STORE => {
            let op = match funct3 {
                0b000 => Op::Sb,
                0b001 => Op::Sh,
                0b010 => Op::Sw,
                _ => return Err(err()),
            };
            Decoded { op, rd: 0, rs1, rs2, imm: s_imm }
        }
        OPCODE_BRANCH => {
            let op = match funct3 {
                0b000 => Op::Beq,
                0b001 => Op::Bne,
                0b100 => Op::Blt,
                0b101 => Op::Bge,
                0b110 => Op::Bltu,
                0b111 => Op::Bgeu,
                _ => return Err(err()),
            };
            Decoded { op, rd: 0, rs1, rs2, imm: b_imm }
        }
        OPCODE_JAL => Decoded { op: Op::Jal, rd, rs1: 0, rs2: 0, imm: j_imm },
        OPCODE_JALR => {
            if funct3 != 0 {
                return Err(err());
            }
            Decoded { op: Op::Jalr, rd, rs1, rs2: 0, imm: i_imm }
        }
        OPCODE_LUI => Decoded { op: Op::Lui, rd, rs1: 0, rs2: 0, imm: u_imm },
        OPCODE_AUIPC => Decoded { op: Op::Auipc, rd, rs1: 0, rs2: 0, imm: u_imm },
        OPCODE_FENCE => {
            let op = if funct3 == 0b001 { Op::FenceI } else { Op::Fence };
            Decoded { op, rd: 0, rs1: 0, rs2: 0, imm: 0 }
        }
        OPCODE_OP_IMM => {
            let op = match funct3 {
                0b000 => Op::Addi,
                0b010 => Op::Slti,
                0b011 => Op::Sltiu,
                0b100 => Op::Xori,
                0b110 => Op::Ori,
                0b111 => Op::Andi,
                0b001 => Op::Slli,
                0b101 => {
                    if get(funct7, 5, 1) == 0b10000 {
                        Op::Srai
                    } else {
                        Op::Srli
                    }
                }
                _ => return Err(err()),
            };
            // shamt lives in rs2's bit position for the shift forms; for
            // the rest imm is the sign-extended 12-bit I-immediate.
            let imm = match op {
                Op::Slli | Op::Srli | Op::Srai => get(word, 24, 20),
                _ => i_imm,
            };
            Decoded { op, rd, rs1, rs2: 0, imm }
        }
        OPCODE_OP => {
            let op = if funct7 & 1 != 0 {
                match funct3 {
                    0b000 => Op::Mul,
                    0b001 => Op::Mulh,
                    0b010 => Op::Mulhsu,
                    0b011 => Op::Mulhu,
                    0b100 => Op::Div,
                    0b101 => Op::Divu,
                    0b110 => Op::Rem,
                    0b111 => Op::Remu,
                    _ => return Err(err()),
                }
            } else {
                match funct3 {
                    0b000 => {
                        if funct7 == 0b0100000 {
                            Op::Sub
                        } else {
                            Op::Add
                        }
                    }
                    0b001 => Op::Sll,
                    0b010 => Op::Slt,
                    0b011 => Op::Sltu,
                    0b100 => Op::Xor,
                    0b101 => {
                        if funct7 == 0b0100000 {
                            Op::Sra
                        } else {
                            Op::Srl
                        }
                    }
                    0b110 => Op::Or,
                    0b111 => Op::And,
                    _ => return Err(err()),
                }
            };
            Decoded { op, rd, rs1, rs2, imm: 0 }
        }
        OPCODE_AMO => {
            if funct3 != 0b010 {
                return Err(err());
            }
            let op = match get(funct7, 6, 2) {
                0b00010 => Op::LrW,
                0b00011 => Op::ScW,
                0b00001 => Op::AmoswapW,
                0b00000 => Op::AmoaddW,
                0b00100 => Op::AmoxorW,
                0b01100 => Op::AmoandW,
                0b01000 => Op::AmoorW,
                0b10000 => Op::AmominW,
                0b10100 => Op::AmomaxW,
                0b11000 => Op::AmominuW,
                0b11100 => Op::AmomaxuW,
                _ => return Err(err()),
            };
            Decoded { op, rd, rs1, rs2, imm: 0 }
        }
        OPCODE_SYSTEM => {
            if funct3 == 0 {
                let op = match i_imm & 0xFFF {
                    0x000 => Op::Ecall,
                    0x001 => Op::Ebreak,
                    0x102 => Op::Sret,
                    0x105 => Op::Wfi,
                    _ => {
                        if funct7 == 0b0001001 {
                            Op::SfenceVma
                        } else {
                            // SINVAL.VMA / SFENCE.W.INVAL / SFENCE.INVAL.IR
                            // all behave as SFENCE.VMA no-ops here.
                            Op::SfenceVma
                        }
                    }
                };
                Decoded { op, rd: 0, rs1: 0, rs2: 0, imm: 0 }
            } else {
                let op = match funct3 {
                    0b001 => Op::Csrrw,
                    0b010 => Op::Csrrs,
                    0b011 => Op::Csrrc,
                    0b101 => Op::Csrrwi,
                    0b110 => Op::Csrrsi,
                    0b111 => Op::Csrrci,
                    _ => return Err(err()),
                };
                // csr address is the I-immediate's raw 12 bits, unsigned.
                let csr_addr = get(word, 31, 20);
                Decoded { op, rd, rs1, rs2: 0, imm: csr_addr }
            }
        }
        _ => return Err(err()),
    };
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_addi() {
        // addi x1, x0, 7
        let word = (7 << 20) | (0 << 15) | (0b000 << 12) | (1 << 7) | OPCODE_OP_IMM;
        let d = decode(word).unwrap();
        assert_eq!(d.op, Op::Addi);
        assert_eq!(d.rd, 1);
        assert_eq!(d.imm, 7);
    }

    #[test]
    fn decodes_sub_vs_add_by_funct7() {
        let add = (0b0000000 << 25) | (2 << 20) | (1 << 15) | (1 << 7) | OPCODE_OP;
        let sub = (0b0100000 << 25) | (2 << 20) | (1 << 15) | (1 << 7) | OPCODE_OP;
        assert_eq!(decode(add).unwrap().op, Op::Add);
        assert_eq!(decode(sub).unwrap().op, Op::Sub);
    }

    #[test]
    fn decodes_mul_via_funct7_bit0() {
        let mul = (0b0000001 << 25) | (2 << 20) | (1 << 15) | (0b000 << 12) | (1 << 7) | OPCODE_OP;
        assert_eq!(decode(mul).unwrap().op, Op::Mul);
    }

    #[test]
    fn decodes_beq_branch_immediate() {
        // beq x0, x0, 16
        let imm = 16u32;
        let word = (get(imm, 12, 12) << 31)
            | (get(imm, 10, 5) << 25)
            | (0 << 20)
            | (0 << 15)
            | (0b000 << 12)
            | (get(imm, 4, 1) << 8)
            | (get(imm, 11, 11) << 7)
            | OPCODE_BRANCH;
        let d = decode(word).unwrap();
        assert_eq!(d.op, Op::Beq);
        assert_eq!(d.imm, 16);
    }

    #[test]
    fn decodes_lr_and_sc() {
        let lr = (0b00010 << 27) | (0 << 25) | (0 << 20) | (1 << 15) | (0b010 << 12) | (2 << 7) | OPCODE_AMO;
        let sc = (0b00011 << 27) | (0 << 25) | (3 << 20) | (1 << 15) | (0b010 << 12) | (2 << 7) | OPCODE_AMO;
        assert_eq!(decode(lr).unwrap().op, Op::LrW);
        assert_eq!(decode(sc).unwrap().op, Op::ScW);
    }

    #[test]
    fn unknown_opcode_is_a_decode_error() {
        assert!(decode(0b0000000).is_err());
    }
}
