use crate::backend::arm32::platform::{is_imm_operand, is_ldst_offset, reg_name, REG_FP};

/// Where a value lives for the instruction selector: a register, an
/// immediate, a frame or stack slot, or a global symbol. The `*Addr`
/// variants denote the *address* of the location rather than its
/// contents (array bases).
#[derive(Debug, Clone, PartialEq)]
pub enum MemLoc {
    Reg(u8),
    Imm(i32),
    Frame(i32),
    FrameAddr(i32),
    Sp(i32),
    Global(String),
    GlobalAddr(String),
}

/// Typed pseudo-assembly line buffer. Pure text shaping: the only
/// decisions made here are instruction-encoding ones (immediate ranges,
/// literal-pool loads).
pub struct IlocArm32 {
    lines: Vec<String>,
}

impl IlocArm32 {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub fn finish(self) -> Vec<String> {
        self.lines
    }

    pub fn label(&mut self, name: &str) {
        self.lines.push(format!("{}:", name));
    }

    pub fn inst(&mut self, op: &str, args: &[&str]) {
        if args.is_empty() {
            self.lines.push(format!("\t{}", op));
        } else {
            self.lines.push(format!("\t{} {}", op, args.join(", ")));
        }
    }

    pub fn comment(&mut self, text: &str) {
        self.lines.push(format!("\t@ {}", text));
    }

    pub fn jump(&mut self, label: &str) {
        self.inst("b", &[label]);
    }

    pub fn call_fun(&mut self, name: &str) {
        self.inst("bl", &[name]);
    }

    pub fn nop(&mut self) {
        self.inst("nop", &[]);
    }

    /// Materialize the value at `loc` into `reg`.
    pub fn load_var(&mut self, reg: u8, loc: &MemLoc) {
        let rd = reg_name(reg);
        match loc {
            MemLoc::Reg(src) => {
                if *src != reg {
                    self.inst("mov", &[rd, reg_name(*src)]);
                }
            }
            MemLoc::Imm(value) => {
                if is_imm_operand(*value) {
                    self.inst("mov", &[rd, &format!("#{}", value)]);
                } else {
                    self.inst("ldr", &[rd, &format!("={}", value)]);
                }
            }
            MemLoc::Frame(offset) => {
                if is_ldst_offset(*offset) {
                    self.inst("ldr", &[rd, &format!("[{}, #{}]", reg_name(REG_FP), offset)]);
                } else {
                    self.inst("ldr", &[rd, &format!("={}", offset)]);
                    self.inst("add", &[rd, reg_name(REG_FP), rd]);
                    self.inst("ldr", &[rd, &format!("[{}]", rd)]);
                }
            }
            MemLoc::FrameAddr(offset) => self.frame_address(reg, *offset),
            MemLoc::Sp(offset) => {
                self.inst("ldr", &[rd, &format!("[sp, #{}]", offset)]);
            }
            MemLoc::Global(name) => {
                self.inst("ldr", &[rd, &format!("={}", name)]);
                self.inst("ldr", &[rd, &format!("[{}]", rd)]);
            }
            MemLoc::GlobalAddr(name) => {
                self.inst("ldr", &[rd, &format!("={}", name)]);
            }
        }
    }

    /// Store `reg` into `loc`. `tmp` is used for addresses that do not
    /// fit an immediate offset and for global stores.
    pub fn store_var(&mut self, reg: u8, loc: &MemLoc, tmp: u8) {
        let rs = reg_name(reg);
        match loc {
            MemLoc::Reg(dst) => {
                if *dst != reg {
                    self.inst("mov", &[reg_name(*dst), rs]);
                }
            }
            MemLoc::Frame(offset) => {
                if is_ldst_offset(*offset) {
                    self.inst("str", &[rs, &format!("[{}, #{}]", reg_name(REG_FP), offset)]);
                } else {
                    self.frame_address(tmp, *offset);
                    self.inst("str", &[rs, &format!("[{}]", reg_name(tmp))]);
                }
            }
            MemLoc::Sp(offset) => {
                self.inst("str", &[rs, &format!("[sp, #{}]", offset)]);
            }
            MemLoc::Global(name) => {
                self.inst("ldr", &[reg_name(tmp), &format!("={}", name)]);
                self.inst("str", &[rs, &format!("[{}]", reg_name(tmp))]);
            }
            MemLoc::Imm(_) | MemLoc::FrameAddr(_) | MemLoc::GlobalAddr(_) => {
                unreachable!("store into a non-memory location")
            }
        }
    }

    /// reg = fp + offset
    fn frame_address(&mut self, reg: u8, offset: i32) {
        let rd = reg_name(reg);
        let fp = reg_name(REG_FP);
        if offset >= 0 && is_imm_operand(offset) {
            self.inst("add", &[rd, fp, &format!("#{}", offset)]);
        } else if offset < 0 && is_imm_operand(-offset) {
            self.inst("sub", &[rd, fp, &format!("#{}", -offset)]);
        } else {
            self.inst("ldr", &[rd, &format!("={}", offset)]);
            self.inst("add", &[rd, fp, rd]);
        }
    }

    /// Establish the frame pointer and reserve the frame.
    pub fn alloc_stack(&mut self, frame_size: i32, tmp: u8) {
        self.inst("mov", &["fp", "sp"]);
        if frame_size > 0 {
            if is_imm_operand(frame_size) {
                self.inst("sub", &["sp", "sp", &format!("#{}", frame_size)]);
            } else {
                self.inst("ldr", &[reg_name(tmp), &format!("={}", frame_size)]);
                self.inst("sub", &["sp", "sp", reg_name(tmp)]);
            }
        }
    }
}

impl Default for IlocArm32 {
    fn default() -> Self {
        Self::new()
    }
}
