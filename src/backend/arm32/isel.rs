use crate::backend::arm32::error::{BackendError, BackendResult};
use crate::backend::arm32::iloc::{IlocArm32, MemLoc};
use crate::backend::arm32::platform::{reg_name, REG_FP, REG_LR, REG_TMP};
use crate::backend::arm32::regalloc::SimpleRegisterAllocator;
use crate::middleend::ir::emitter::format_inst;
use crate::middleend::ir::module::{
    BinaryOp, CmpOp, InstKind, IrFunction, IrType, LabelId, Module, ValueRef,
};
use std::collections::HashMap;

/// Per-function frame layout, fixed before selection starts. Locals and
/// instruction temporaries live at negative fp offsets, outgoing stack
/// arguments at [sp, #0] upward, incoming stack parameters above the
/// saved registers.
pub struct FrameLayout {
    local_offsets: Vec<i32>,
    temp_offsets: HashMap<usize, i32>,
    pub frame_size: i32,
    pub saved: Vec<u8>,
}

impl FrameLayout {
    pub fn compute(func: &IrFunction) -> Self {
        let mut offset = 0i32;
        let mut local_offsets = Vec::with_capacity(func.locals.len());
        for local in &func.locals {
            offset -= slot_size(&local.ty);
            local_offsets.push(offset);
        }

        let mut temp_offsets = HashMap::new();
        for (index, inst) in func.body.iter().enumerate() {
            if inst.temp.is_some() {
                offset -= 4;
                temp_offsets.insert(index, offset);
            }
        }

        let out_args = 4 * func.max_call_arg_count.saturating_sub(4) as i32;
        let frame_size = (-offset + out_args + 7) & !7;

        // The allocator frees everything after each IR instruction and
        // hands out r4..r10 lowest-first, so the callee-saved registers
        // a function can touch follow from its worst-case instruction.
        let mut demand = 0u8;
        for inst in &func.body {
            demand = demand.max(scratch_demand(&inst.kind, func));
        }
        let mut saved: Vec<u8> = (4..4 + demand).collect();
        saved.push(REG_FP);
        if func.exists_call {
            saved.push(REG_LR);
        }

        Self {
            local_offsets,
            temp_offsets,
            frame_size,
            saved,
        }
    }

    fn incoming_param_offset(&self, index: usize) -> i32 {
        4 * self.saved.len() as i32 + 4 * (index as i32 - 4)
    }
}

fn slot_size(ty: &IrType) -> i32 {
    match ty {
        // A size-erased array parameter holds a caller-provided base
        // address; an array with storage owns its full extent.
        IrType::Array { dims, .. } => {
            if dims.first().copied().unwrap_or(0) == 0 {
                4
            } else {
                ty.size()
            }
        }
        // i1 occupies a full word slot.
        _ => 4,
    }
}

fn scratch_demand(kind: &InstKind, func: &IrFunction) -> u8 {
    match kind {
        InstKind::Binary {
            op: BinaryOp::Mod, ..
        } => 5,
        InstKind::Binary { .. } | InstKind::Cmp { .. } | InstKind::PtrAdd { .. } => 3,
        InstKind::LoadArray { .. } | InstKind::StoreArray { .. } => 2,
        InstKind::Move { .. } | InstKind::CondGoto { .. } => 1,
        InstKind::Call { .. } => {
            if func.max_call_arg_count > 4 {
                1
            } else {
                0
            }
        }
        _ => 0,
    }
}

/// Walks one function's instruction list in order and emits ARM32
/// assembly through the ILoc buffer.
pub struct InstSelectorArm32<'a> {
    module: &'a Module,
    func: &'a IrFunction,
    iloc: IlocArm32,
    alloc: SimpleRegisterAllocator,
    layout: FrameLayout,
    real_arg_count: usize,
    errors: Vec<BackendError>,
    show_ir: bool,
}

impl<'a> InstSelectorArm32<'a> {
    pub fn new(module: &'a Module, func: &'a IrFunction, show_ir: bool) -> Self {
        Self {
            module,
            func,
            iloc: IlocArm32::new(),
            alloc: SimpleRegisterAllocator::new(),
            layout: FrameLayout::compute(func),
            real_arg_count: 0,
            errors: Vec::new(),
            show_ir,
        }
    }

    pub fn run(&mut self) {
        let func = self.func;
        for index in 0..func.body.len() {
            let inst = &func.body[index];
            if inst.dead {
                continue;
            }
            if self.show_ir {
                if let Some(line) = format_inst(self.module, func, inst) {
                    self.iloc.comment(&line);
                }
            }
            if let Err(err) = self.translate(index) {
                self.errors.push(err);
            }
        }
    }

    pub fn finish(self) -> (Vec<String>, Vec<BackendError>) {
        (self.iloc.finish(), self.errors)
    }

    fn translate(&mut self, index: usize) -> BackendResult<()> {
        let func = self.func;
        match &func.body[index].kind {
            InstKind::Entry => self.translate_entry(),
            InstKind::Exit { value } => self.translate_exit(*value),
            InstKind::Label(label) => {
                let name = self.asm_label(*label);
                self.iloc.label(&name);
                Ok(())
            }
            InstKind::Goto { target } => {
                let name = self.asm_label(*target);
                self.iloc.jump(&name);
                Ok(())
            }
            InstKind::CondGoto {
                cond,
                if_true,
                if_false,
            } => self.translate_br(*cond, *if_true, *if_false),
            InstKind::Move { dst, src } => {
                let dst_loc = self.loc_of(*dst)?;
                let src_loc = self.loc_of(*src)?;
                self.move_value(dst_loc, src_loc, "move")
            }
            InstKind::Binary { op, lhs, rhs } => match op {
                BinaryOp::Mod => self.translate_mod(index, *lhs, *rhs),
                _ => {
                    let op_name = match op {
                        BinaryOp::Add => "add",
                        BinaryOp::Sub => "sub",
                        BinaryOp::Mul => "mul",
                        BinaryOp::Div => "sdiv",
                        BinaryOp::Mod => unreachable!(),
                    };
                    self.translate_two_operator(index, op_name, *lhs, *rhs)
                }
            },
            InstKind::Cmp { op, lhs, rhs } => self.translate_cmp(index, *op, *lhs, *rhs),
            InstKind::PtrAdd { base, offset } => {
                self.translate_two_operator(index, "add", *base, *offset)
            }
            InstKind::Arg { .. } => {
                // Placement happens at the call; here only the running
                // count is maintained.
                self.real_arg_count += 1;
                Ok(())
            }
            InstKind::Call { callee, args } => self.translate_call(index, *callee, args),
            InstKind::LoadArray { addr } => self.translate_load_array(index, *addr),
            InstKind::StoreArray { value, addr } => self.translate_store_array(*value, *addr),
            InstKind::Slice { .. } => Ok(()),
        }
    }

    fn translate_entry(&mut self) -> BackendResult<()> {
        let saved = self
            .layout
            .saved
            .iter()
            .map(|&reg| reg_name(reg))
            .collect::<Vec<_>>()
            .join(",");
        self.iloc.inst("push", &[&format!("{{{}}}", saved)]);
        self.iloc.alloc_stack(self.layout.frame_size, REG_TMP);
        Ok(())
    }

    fn translate_exit(&mut self, value: Option<ValueRef>) -> BackendResult<()> {
        if let Some(value) = value {
            let loc = self.loc_of(value)?;
            self.iloc.load_var(0, &loc);
        }
        self.iloc.inst("mov", &["sp", "fp"]);
        let saved = self
            .layout
            .saved
            .iter()
            .map(|&reg| reg_name(reg))
            .collect::<Vec<_>>()
            .join(",");
        self.iloc.inst("pop", &[&format!("{{{}}}", saved)]);
        self.iloc.inst("bx", &["lr"]);
        Ok(())
    }

    /// Unconditional branches become `b`; conditional ones load the
    /// condition, compare against zero and branch twice. The true target
    /// is taken on non-zero.
    fn translate_br(
        &mut self,
        cond: ValueRef,
        if_true: LabelId,
        if_false: LabelId,
    ) -> BackendResult<()> {
        let reg = self.operand_reg(cond, "branch condition")?;
        self.iloc.inst("cmp", &[reg_name(reg), "#0"]);
        let true_name = self.asm_label(if_true);
        let false_name = self.asm_label(if_false);
        self.iloc.inst("bne", &[&true_name]);
        self.iloc.jump(&false_name);
        self.alloc.release_value(cond);
        Ok(())
    }

    fn translate_two_operator(
        &mut self,
        index: usize,
        op_name: &str,
        lhs: ValueRef,
        rhs: ValueRef,
    ) -> BackendResult<()> {
        let r1 = self.operand_reg(lhs, op_name)?;
        let r2 = self.operand_reg(rhs, op_name)?;
        let rd = self.alloc.allocate(Some(ValueRef::Temp(index)), op_name)?;
        self.iloc
            .inst(op_name, &[reg_name(rd), reg_name(r1), reg_name(r2)]);
        self.store_temp(index, rd);
        self.alloc.release_value(lhs);
        self.alloc.release_value(rhs);
        self.alloc.release_value(ValueRef::Temp(index));
        Ok(())
    }

    /// `a % b` has no ARM instruction; it is synthesized as
    /// `a - (a sdiv b) * b` through two auxiliary registers.
    fn translate_mod(&mut self, index: usize, lhs: ValueRef, rhs: ValueRef) -> BackendResult<()> {
        let r1 = self.operand_reg(lhs, "mod")?;
        let r2 = self.operand_reg(rhs, "mod")?;
        let rd = self.alloc.allocate(Some(ValueRef::Temp(index)), "mod")?;
        let div_reg = self.alloc.allocate(None, "mod quotient")?;
        let mul_reg = self.alloc.allocate(None, "mod product")?;

        self.iloc
            .inst("sdiv", &[reg_name(div_reg), reg_name(r1), reg_name(r2)]);
        self.iloc
            .inst("mul", &[reg_name(mul_reg), reg_name(div_reg), reg_name(r2)]);
        self.iloc
            .inst("sub", &[reg_name(rd), reg_name(r1), reg_name(mul_reg)]);

        self.store_temp(index, rd);
        self.alloc.release(div_reg);
        self.alloc.release(mul_reg);
        self.alloc.release_value(lhs);
        self.alloc.release_value(rhs);
        self.alloc.release_value(ValueRef::Temp(index));
        Ok(())
    }

    /// cmp, zero the destination, then a conditional mov sets 1.
    fn translate_cmp(
        &mut self,
        index: usize,
        op: CmpOp,
        lhs: ValueRef,
        rhs: ValueRef,
    ) -> BackendResult<()> {
        let r1 = self.operand_reg(lhs, "compare")?;
        let r2 = self.operand_reg(rhs, "compare")?;
        let rd = self.alloc.allocate(Some(ValueRef::Temp(index)), "compare")?;

        self.iloc.inst("cmp", &[reg_name(r1), reg_name(r2)]);
        self.iloc.inst("mov", &[reg_name(rd), "#0"]);
        let mov_cc = format!("mov{}", op.cond_suffix());
        self.iloc.inst(&mov_cc, &[reg_name(rd), "#1"]);

        self.store_temp(index, rd);
        self.alloc.release_value(lhs);
        self.alloc.release_value(rhs);
        self.alloc.release_value(ValueRef::Temp(index));
        Ok(())
    }

    /// AAPCS call: the first four arguments go to r0..r3, the rest to
    /// the outgoing stack area, all staged through synthesized moves
    /// immediately before the branch.
    fn translate_call(
        &mut self,
        index: usize,
        callee: usize,
        args: &[ValueRef],
    ) -> BackendResult<()> {
        let callee_name = self.module.functions[callee].name.clone();
        if self.real_arg_count != args.len() && self.real_arg_count != 0 {
            self.errors.push(BackendError::ArgRegisterMisassignment {
                context: format!(
                    "call @{}: {} Arg instruction(s) for {} operand(s)",
                    callee_name,
                    self.real_arg_count,
                    args.len()
                ),
            });
        }

        let reg_args = args.len().min(4);
        if !args.is_empty() {
            // r0..r3 are held for the duration of the call sequence.
            for k in 0..4u8 {
                if !self.alloc.reserve(k) {
                    self.errors.push(BackendError::ArgRegisterMisassignment {
                        context: format!("call @{}: r{} already occupied", callee_name, k),
                    });
                }
            }

            // Stack arguments are written before the register moves.
            let out_area = 4 * self.func.max_call_arg_count.saturating_sub(4) as i32;
            for (k, &arg) in args.iter().enumerate().skip(4) {
                let offset = 4 * (k as i32 - 4);
                if offset + 4 > out_area {
                    return Err(BackendError::InvalidStackArgAddressing {
                        context: format!(
                            "call @{}: argument {} at [sp, #{}] outside the reserved {} bytes",
                            callee_name, k, offset, out_area
                        ),
                    });
                }
                let src = self.loc_of(arg)?;
                self.move_value(MemLoc::Sp(offset), src, "stack argument")?;
            }

            for (k, &arg) in args.iter().enumerate().take(reg_args) {
                let src = self.loc_of(arg)?;
                self.move_value(MemLoc::Reg(k as u8), src, "register argument")?;
            }
        }

        self.iloc.call_fun(&callee_name);

        if self.func.body[index].temp.is_some() {
            let dst = self.loc_of(ValueRef::Temp(index))?;
            self.iloc.store_var(0, &dst, REG_TMP);
        }

        if !args.is_empty() {
            for k in 0..4u8 {
                self.alloc.release(k);
            }
        }
        self.real_arg_count = 0;
        Ok(())
    }

    fn translate_load_array(&mut self, index: usize, addr: ValueRef) -> BackendResult<()> {
        let ra = self.operand_reg(addr, "array load")?;
        let rd = self
            .alloc
            .allocate(Some(ValueRef::Temp(index)), "array load")?;
        self.iloc
            .inst("ldr", &[reg_name(rd), &format!("[{}]", reg_name(ra))]);
        self.store_temp(index, rd);
        self.alloc.release_value(addr);
        self.alloc.release_value(ValueRef::Temp(index));
        Ok(())
    }

    fn translate_store_array(&mut self, value: ValueRef, addr: ValueRef) -> BackendResult<()> {
        let rv = self.operand_reg(value, "array store")?;
        let ra = self.operand_reg(addr, "array store")?;
        self.iloc
            .inst("str", &[reg_name(rv), &format!("[{}]", reg_name(ra))]);
        self.alloc.release_value(value);
        self.alloc.release_value(addr);
        Ok(())
    }

    /// Move between arbitrary locations, in the register/memory matrix:
    /// register sources store directly, register destinations load
    /// directly, memory-to-memory goes through one scratch register.
    fn move_value(&mut self, dst: MemLoc, src: MemLoc, context: &str) -> BackendResult<()> {
        if let MemLoc::Reg(src_reg) = src {
            self.iloc.store_var(src_reg, &dst, REG_TMP);
            return Ok(());
        }
        if let MemLoc::Reg(dst_reg) = dst {
            self.iloc.load_var(dst_reg, &src);
            return Ok(());
        }
        let scratch = self.alloc.allocate(None, context)?;
        self.iloc.load_var(scratch, &src);
        self.iloc.store_var(scratch, &dst, REG_TMP);
        self.alloc.release(scratch);
        Ok(())
    }

    /// Bring an operand into a register, reusing an existing binding.
    fn operand_reg(&mut self, value: ValueRef, context: &str) -> BackendResult<u8> {
        if let Some(reg) = self.alloc.binding(value) {
            return Ok(reg);
        }
        let loc = self.loc_of(value)?;
        if let MemLoc::Reg(reg) = loc {
            return Ok(reg);
        }
        let reg = self.alloc.allocate(Some(value), context)?;
        self.iloc.load_var(reg, &loc);
        Ok(reg)
    }

    fn store_temp(&mut self, index: usize, reg: u8) {
        let offset = *self
            .layout
            .temp_offsets
            .get(&index)
            .expect("temporary has a frame slot");
        self.iloc.store_var(reg, &MemLoc::Frame(offset), REG_TMP);
    }

    /// Resolve a value to its location. Array variables stand for their
    /// base address; a size-erased array parameter's slot already holds
    /// one.
    fn loc_of(&self, value: ValueRef) -> BackendResult<MemLoc> {
        match value {
            ValueRef::Const(_) => {
                let v = self
                    .module
                    .const_value(value)
                    .expect("constant reference resolves");
                Ok(MemLoc::Imm(v))
            }
            ValueRef::Global(index) => {
                let global = &self.module.globals[index];
                if global.ty.is_array() {
                    Ok(MemLoc::GlobalAddr(global.name.clone()))
                } else {
                    Ok(MemLoc::Global(global.name.clone()))
                }
            }
            ValueRef::Param(index) => {
                if index < 4 {
                    Ok(MemLoc::Reg(index as u8))
                } else {
                    Ok(MemLoc::Frame(self.layout.incoming_param_offset(index)))
                }
            }
            ValueRef::Local(index) => {
                let offset = self.layout.local_offsets[index];
                match &self.func.locals[index].ty {
                    IrType::Array { dims, .. } if dims.first().copied().unwrap_or(0) != 0 => {
                        Ok(MemLoc::FrameAddr(offset))
                    }
                    _ => Ok(MemLoc::Frame(offset)),
                }
            }
            ValueRef::Temp(index) => match &self.func.body[index].kind {
                InstKind::Slice { addr } => self.loc_of(*addr),
                _ => Ok(MemLoc::Frame(
                    *self
                        .layout
                        .temp_offsets
                        .get(&index)
                        .expect("temporary has a frame slot"),
                )),
            },
        }
    }

    fn asm_label(&self, label: LabelId) -> String {
        format!(".L{}_{}", self.func.name, label.0)
    }
}
