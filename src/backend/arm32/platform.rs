/// ARM32 integer register file. `r0..r3` pass arguments and results,
/// `r4..r10` are the allocator's scratch pool, the rest are reserved.
pub const REG_NAMES: [&str; 16] = [
    "r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7", "r8", "r9", "r10", "fp", "ip", "sp", "lr",
    "pc",
];

pub const REG_FP: u8 = 11;
pub const REG_TMP: u8 = 12;
pub const REG_SP: u8 = 13;
pub const REG_LR: u8 = 14;

/// First and last register handed out by the simple allocator.
pub const SCRATCH_FIRST: u8 = 4;
pub const SCRATCH_LAST: u8 = 10;

pub fn reg_name(no: u8) -> &'static str {
    REG_NAMES[no as usize]
}

/// ARM data-processing immediates are an 8-bit value rotated right by an
/// even amount.
pub fn is_imm_operand(value: i32) -> bool {
    let value = value as u32;
    (0u32..32)
        .step_by(2)
        .any(|rot| value.rotate_left(rot) <= 0xff)
}

/// Immediate offset range of `ldr`/`str`.
pub fn is_ldst_offset(offset: i32) -> bool {
    (-4095..=4095).contains(&offset)
}
