use crate::frontend::parser::ast::{
    AssignStmt, BinOp, Block, BlockItem, CompileUnit, DeclStmt, Expr, FuncDef, IfStmt, Item, Stmt,
    TypeSpec, UnOp, VarDef, WhileStmt,
};
use crate::middleend::ir::error::{LowerError, LowerResult};
use crate::middleend::ir::module::{
    BinaryOp, CmpOp, FormalParam, InstKind, IrType, LabelId, Module, ValueRef,
};

/// How the value of an expression will be consumed. A comparison lowered
/// in `Condition` context yields its raw `i1`; anywhere else it is
/// widened to `i32` through the branch-based bool-to-int pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExprCtx {
    RValue,
    Condition,
}

/// Drives AST-to-IR translation for a whole compile unit.
pub struct Lower<'a> {
    unit: &'a CompileUnit,
}

impl<'a> Lower<'a> {
    pub fn new(unit: &'a CompileUnit) -> Self {
        Self { unit }
    }

    pub fn run(&self) -> LowerResult<Module> {
        let mut module = Module::new();
        for item in &self.unit.items {
            match item {
                Item::FuncDef(func) => {
                    let mut lowering = FuncLowering {
                        module: &mut module,
                        loop_stack: Vec::new(),
                    };
                    lowering.lower_func_def(func)?;
                }
                Item::Decl(decl) => self.lower_global_decl(&mut module, decl)?,
            }
        }
        Ok(module)
    }

    fn lower_global_decl(&self, module: &mut Module, decl: &DeclStmt) -> LowerResult<()> {
        for def in &decl.defs {
            match def {
                VarDef::Scalar { name, init, .. } => {
                    let var = module.new_var_value(IrType::Int32, Some(name));
                    if let Some(init) = init {
                        let value =
                            const_eval(init).ok_or_else(|| LowerError::NonConstGlobalInit {
                                name: name.clone(),
                                line: init.line(),
                            })?;
                        if let ValueRef::Global(index) = var {
                            module.globals[index].init = Some(value);
                        }
                    }
                }
                VarDef::Array { name, dims, .. } => {
                    // Same defaulting rule as local and parameter
                    // dimensions: a non-constant dimension falls back
                    // to 10 with a diagnostic.
                    let mut sizes = Vec::new();
                    for dim in dims {
                        match const_eval(dim) {
                            Some(c) => {
                                if c <= 0 {
                                    return Err(LowerError::InvalidArrayDimension {
                                        name: name.clone(),
                                        line: dim.line(),
                                    });
                                }
                                sizes.push(c);
                            }
                            None => {
                                eprintln!(
                                    "Warning: line {}: non-constant dimension for array '{}', defaulting to 10",
                                    dim.line(),
                                    name
                                );
                                sizes.push(10);
                            }
                        }
                    }
                    module.new_var_value(IrType::array_of(sizes), Some(name));
                }
            }
        }
        Ok(())
    }
}

/// Per-function lowering state: the loop-label stack plus shorthand
/// emission helpers over the module's current function.
struct FuncLowering<'m> {
    module: &'m mut Module,
    /// Innermost last: (condition label, end label) of enclosing loops.
    loop_stack: Vec<(LabelId, LabelId)>,
}

impl<'m> FuncLowering<'m> {
    fn lower_func_def(&mut self, func: &FuncDef) -> LowerResult<()> {
        if self.module.current_function().is_some() {
            return Err(LowerError::NestedFunctionDefinition { line: func.line });
        }
        let return_type = match func.return_type {
            TypeSpec::Int => IrType::Int32,
            TypeSpec::Void => IrType::Void,
        };
        let func_index = self.module.new_function(&func.name, return_type.clone());
        self.module.set_current_function(Some(func_index));
        self.module.enter_scope();

        self.emit(InstKind::Entry, IrType::Void);

        // First pass over the parameter list: build the formal values,
        // promoting to an array type (leading dimension 0) when the
        // parameter carries dimension subtrees.
        for param in &func.params {
            let ty = match &param.array_dims {
                None => IrType::Int32,
                Some(dim_exprs) => {
                    let mut dims = vec![0];
                    for expr in dim_exprs {
                        match const_eval(expr) {
                            Some(value) if value > 0 => dims.push(value),
                            _ => {
                                eprintln!(
                                    "Warning: line {}: non-constant dimension for parameter '{}', defaulting to 10",
                                    expr.line(),
                                    param.name
                                );
                                dims.push(10);
                            }
                        }
                    }
                    IrType::array_of(dims)
                }
            };
            self.module.cur_func_mut().params.push(FormalParam {
                name: param.name.clone(),
                ty,
            });
        }

        // Second pass: a same-named local per parameter plus a copy-in
        // move, so the body may freely assign the name.
        for (index, param) in func.params.iter().enumerate() {
            let ty = self.module.cur_func().params[index].ty.clone();
            let local = self.module.new_var_value(ty, Some(&param.name));
            self.emit(
                InstKind::Move {
                    dst: local,
                    src: ValueRef::Param(index),
                },
                IrType::Void,
            );
        }

        // Return slot for non-void functions, initialized to 0.
        if return_type != IrType::Void {
            let slot = self.module.new_var_value(IrType::Int32, None);
            if let ValueRef::Local(index) = slot {
                self.module.cur_func_mut().return_slot = Some(index);
            }
            let zero = self.const_int(0);
            self.emit(InstKind::Move { dst: slot, src: zero }, IrType::Void);
        }

        // The function scope is already open; the body block must not
        // push another one.
        self.lower_block(&func.body, false)?;

        let exit_label = self.module.cur_func().exit_label;
        let ret = self.module.cur_func().return_slot.map(ValueRef::Local);
        self.emit(InstKind::Label(exit_label), IrType::Void);
        self.emit(InstKind::Exit { value: ret }, IrType::Void);

        self.module.leave_scope();
        self.module.set_current_function(None);
        Ok(())
    }

    fn lower_block(&mut self, block: &Block, need_scope: bool) -> LowerResult<()> {
        if need_scope {
            self.module.enter_scope();
        }
        let mut result = Ok(());
        for item in &block.items {
            result = match item {
                BlockItem::Decl(decl) => self.lower_local_decl(decl),
                BlockItem::Stmt(stmt) => self.lower_stmt(stmt),
            };
            if result.is_err() {
                break;
            }
        }
        if need_scope {
            self.module.leave_scope();
        }
        result
    }

    fn lower_local_decl(&mut self, decl: &DeclStmt) -> LowerResult<()> {
        for def in &decl.defs {
            match def {
                VarDef::Scalar { name, init, .. } => {
                    // The name is visible in its own initializer.
                    let var = self.module.new_var_value(IrType::Int32, Some(name));
                    if let Some(init) = init {
                        let value = self.lower_expr(init, ExprCtx::RValue)?;
                        self.emit(InstKind::Move { dst: var, src: value }, IrType::Void);
                    }
                }
                VarDef::Array { name, dims, .. } => {
                    let sizes = self.collect_dims(name, dims)?;
                    self.module
                        .new_var_value(IrType::array_of(sizes), Some(name));
                }
            }
        }
        Ok(())
    }

    /// Dimension-collection protocol: each dimension expression is
    /// lowered; a constant result is used as-is, anything else falls
    /// back to 10 with a diagnostic.
    fn collect_dims(&mut self, name: &str, exprs: &[Expr]) -> LowerResult<Vec<i32>> {
        let mut dims = Vec::new();
        for expr in exprs {
            let value = self.lower_expr(expr, ExprCtx::RValue)?;
            match self.module.const_value(value) {
                Some(c) => {
                    if c <= 0 {
                        return Err(LowerError::InvalidArrayDimension {
                            name: name.to_string(),
                            line: expr.line(),
                        });
                    }
                    dims.push(c);
                }
                None => {
                    eprintln!(
                        "Warning: line {}: non-constant dimension for array '{}', defaulting to 10",
                        expr.line(),
                        name
                    );
                    dims.push(10);
                }
            }
        }
        Ok(dims)
    }

    fn lower_stmt(&mut self, stmt: &Stmt) -> LowerResult<()> {
        match stmt {
            Stmt::Empty => Ok(()),
            Stmt::Expr(expr) => {
                self.lower_expr(expr, ExprCtx::RValue)?;
                Ok(())
            }
            Stmt::Assign(assign) => self.lower_assign(assign),
            Stmt::Block(block) => self.lower_block(block, true),
            Stmt::If(if_stmt) => self.lower_if(if_stmt),
            Stmt::While(while_stmt) => self.lower_while(while_stmt),
            Stmt::Break { line } => {
                let Some(&(_, l_end)) = self.loop_stack.last() else {
                    return Err(LowerError::BreakContinueOutsideLoop {
                        stmt: "break",
                        line: *line,
                    });
                };
                self.emit(InstKind::Goto { target: l_end }, IrType::Void);
                Ok(())
            }
            Stmt::Continue { line } => {
                let Some(&(l_cond, _)) = self.loop_stack.last() else {
                    return Err(LowerError::BreakContinueOutsideLoop {
                        stmt: "continue",
                        line: *line,
                    });
                };
                self.emit(InstKind::Goto { target: l_cond }, IrType::Void);
                Ok(())
            }
            Stmt::Return { value, line: _ } => self.lower_return(value.as_ref()),
        }
    }

    fn lower_return(&mut self, value: Option<&Expr>) -> LowerResult<()> {
        let ret = match value {
            Some(expr) => Some(self.lower_expr(expr, ExprCtx::RValue)?),
            None => None,
        };
        let slot = self.module.cur_func().return_slot;
        if let (Some(slot), Some(value)) = (slot, ret) {
            self.emit(
                InstKind::Move {
                    dst: ValueRef::Local(slot),
                    src: value,
                },
                IrType::Void,
            );
        }
        let exit_label = self.module.cur_func().exit_label;
        self.emit(InstKind::Goto { target: exit_label }, IrType::Void);
        Ok(())
    }

    /// `lhs = rhs`: the right-hand side is lowered first. An array
    /// access on the left goes through the address-only path and ends in
    /// a store; the access's load is never emitted.
    fn lower_assign(&mut self, assign: &AssignStmt) -> LowerResult<()> {
        let value = self.lower_expr(&assign.value, ExprCtx::RValue)?;
        match &assign.target {
            Expr::Var { name, line } => {
                let dst = self.module.find_var_value(name).ok_or_else(|| {
                    LowerError::UndefinedSymbol {
                        name: name.clone(),
                        line: *line,
                    }
                })?;
                self.emit(InstKind::Move { dst, src: value }, IrType::Void);
                Ok(())
            }
            Expr::ArrayAccess {
                name,
                indices,
                line,
            } => {
                let (addr, remaining, _) = self.lower_array_address(name, indices, *line)?;
                if !remaining.is_empty() {
                    return Err(LowerError::InvalidArrayAccess {
                        name: name.clone(),
                        line: *line,
                    });
                }
                self.emit(InstKind::StoreArray { value, addr }, IrType::Void);
                Ok(())
            }
            other => Err(LowerError::InvalidAssignTarget { line: other.line() }),
        }
    }

    fn lower_if(&mut self, if_stmt: &IfStmt) -> LowerResult<()> {
        let cond = self.lower_expr(&if_stmt.condition, ExprCtx::Condition)?;

        // Constant condition: only the taken branch is emitted.
        if let Some(c) = self.module.const_value(cond) {
            if c != 0 {
                let l_then = self.new_label();
                let l_end = self.new_label();
                self.emit(InstKind::Label(l_then), IrType::Void);
                self.lower_stmt(&if_stmt.then_stmt)?;
                self.emit(InstKind::Label(l_end), IrType::Void);
            } else if let Some(else_stmt) = &if_stmt.else_stmt {
                let l_else = self.new_label();
                let l_end = self.new_label();
                self.emit(InstKind::Label(l_else), IrType::Void);
                self.lower_stmt(else_stmt)?;
                self.emit(InstKind::Label(l_end), IrType::Void);
            }
            return Ok(());
        }

        let l_then = self.new_label();
        let l_else = self.new_label();
        let l_end = self.new_label();

        self.emit(
            InstKind::CondGoto {
                cond,
                if_true: l_then,
                if_false: l_else,
            },
            IrType::Void,
        );

        self.emit(InstKind::Label(l_then), IrType::Void);
        self.lower_stmt(&if_stmt.then_stmt)?;
        self.emit(InstKind::Goto { target: l_end }, IrType::Void);

        // The else label is emitted even without an else branch; it
        // falls through to the end label.
        self.emit(InstKind::Label(l_else), IrType::Void);
        if let Some(else_stmt) = &if_stmt.else_stmt {
            self.lower_stmt(else_stmt)?;
        }
        self.emit(InstKind::Label(l_end), IrType::Void);
        Ok(())
    }

    fn lower_while(&mut self, while_stmt: &WhileStmt) -> LowerResult<()> {
        let l_cond = self.new_label();
        let l_body = self.new_label();
        let l_end = self.new_label();

        let rollback = self.module.cur_func().body.len();
        self.emit(InstKind::Label(l_cond), IrType::Void);
        let cond = self.lower_expr(&while_stmt.condition, ExprCtx::Condition)?;

        if let Some(c) = self.module.const_value(cond) {
            if c == 0 {
                // while(0): the loop disappears. A constant condition
                // lowered no instructions, so only the label goes.
                self.module.cur_func_mut().body.truncate(rollback);
                return Ok(());
            }
            self.emit(InstKind::Goto { target: l_body }, IrType::Void);
        } else {
            self.emit(
                InstKind::CondGoto {
                    cond,
                    if_true: l_body,
                    if_false: l_end,
                },
                IrType::Void,
            );
        }

        self.emit(InstKind::Label(l_body), IrType::Void);
        self.loop_stack.push((l_cond, l_end));
        let body_result = self.lower_stmt(&while_stmt.body);
        self.loop_stack.pop();
        body_result?;

        self.emit(InstKind::Goto { target: l_cond }, IrType::Void);
        self.emit(InstKind::Label(l_end), IrType::Void);
        Ok(())
    }

    fn lower_expr(&mut self, expr: &Expr, ctx: ExprCtx) -> LowerResult<ValueRef> {
        match expr {
            Expr::LiteralUint { value, .. } => Ok(self.const_int(*value)),
            Expr::Var { name, line } => {
                self.module
                    .find_var_value(name)
                    .ok_or_else(|| LowerError::UndefinedSymbol {
                        name: name.clone(),
                        line: *line,
                    })
            }
            Expr::Unary { op, operand, .. } => match op {
                UnOp::Neg => self.lower_neg(operand),
                UnOp::Not => self.lower_not(operand),
            },
            Expr::Binary { op, lhs, rhs, .. } => match op {
                BinOp::Add => self.lower_arith(BinaryOp::Add, lhs, rhs),
                BinOp::Sub => self.lower_arith(BinaryOp::Sub, lhs, rhs),
                BinOp::Mul => self.lower_arith(BinaryOp::Mul, lhs, rhs),
                BinOp::Div => self.lower_arith(BinaryOp::Div, lhs, rhs),
                BinOp::Mod => self.lower_arith(BinaryOp::Mod, lhs, rhs),
                BinOp::Lt => self.lower_cmp(CmpOp::Lt, lhs, rhs, ctx),
                BinOp::Gt => self.lower_cmp(CmpOp::Gt, lhs, rhs, ctx),
                BinOp::Le => self.lower_cmp(CmpOp::Le, lhs, rhs, ctx),
                BinOp::Ge => self.lower_cmp(CmpOp::Ge, lhs, rhs, ctx),
                BinOp::Eq => self.lower_cmp(CmpOp::Eq, lhs, rhs, ctx),
                BinOp::Ne => self.lower_cmp(CmpOp::Ne, lhs, rhs, ctx),
                BinOp::And => self.lower_short_circuit(lhs, rhs, false),
                BinOp::Or => self.lower_short_circuit(lhs, rhs, true),
            },
            Expr::Call { callee, args, line } => self.lower_call(callee, args, *line),
            Expr::ArrayAccess {
                name,
                indices,
                line,
            } => self.lower_array_access(name, indices, *line),
        }
    }

    /// Left-to-right evaluation, one binary instruction, i32 result.
    fn lower_arith(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> LowerResult<ValueRef> {
        let left = self.lower_expr(lhs, ExprCtx::RValue)?;
        let right = self.lower_expr(rhs, ExprCtx::RValue)?;
        Ok(self.emit(
            InstKind::Binary {
                op,
                lhs: left,
                rhs: right,
            },
            IrType::Int32,
        ))
    }

    fn lower_cmp(
        &mut self,
        op: CmpOp,
        lhs: &Expr,
        rhs: &Expr,
        ctx: ExprCtx,
    ) -> LowerResult<ValueRef> {
        let left = self.lower_expr(lhs, ExprCtx::RValue)?;
        let right = self.lower_expr(rhs, ExprCtx::RValue)?;
        let cmp = self.emit(
            InstKind::Cmp {
                op,
                lhs: left,
                rhs: right,
            },
            IrType::Bool,
        );
        match ctx {
            ExprCtx::Condition => Ok(cmp),
            ExprCtx::RValue => Ok(self.widen_bool(cmp)),
        }
    }

    fn lower_neg(&mut self, operand: &Expr) -> LowerResult<ValueRef> {
        let value = self.lower_expr(operand, ExprCtx::RValue)?;
        let ty = {
            let func = self.module.cur_func();
            self.module.value_type(func, value)
        };
        let target = if ty == IrType::Bool {
            self.widen_bool(value)
        } else {
            value
        };
        let zero = self.const_int(0);
        Ok(self.emit(
            InstKind::Binary {
                op: BinaryOp::Sub,
                lhs: zero,
                rhs: target,
            },
            IrType::Int32,
        ))
    }

    /// `!x` is `x == 0` widened back to i32.
    fn lower_not(&mut self, operand: &Expr) -> LowerResult<ValueRef> {
        let value = self.lower_expr(operand, ExprCtx::RValue)?;
        let zero = self.const_int(0);
        let eq = self.emit(
            InstKind::Cmp {
                op: CmpOp::Eq,
                lhs: value,
                rhs: zero,
            },
            IrType::Bool,
        );
        Ok(self.widen_bool(eq))
    }

    /// Short-circuit `&&` / `||`. The right operand is only evaluated
    /// on the fall-through edge; the shared result register receives the
    /// widened right-hand truth value or the short-circuit constant.
    fn lower_short_circuit(
        &mut self,
        lhs: &Expr,
        rhs: &Expr,
        is_or: bool,
    ) -> LowerResult<ValueRef> {
        let left = self.lower_expr(lhs, ExprCtx::RValue)?;
        let zero = self.const_int(0);
        let left_test = self.emit(
            InstKind::Cmp {
                op: CmpOp::Ne,
                lhs: left,
                rhs: zero,
            },
            IrType::Bool,
        );

        let l_rhs = self.new_label();
        let l_short = self.new_label();
        let l_end = self.new_label();

        let (if_true, if_false) = if is_or {
            (l_short, l_rhs)
        } else {
            (l_rhs, l_short)
        };
        self.emit(
            InstKind::CondGoto {
                cond: left_test,
                if_true,
                if_false,
            },
            IrType::Void,
        );

        self.emit(InstKind::Label(l_rhs), IrType::Void);
        let right = self.lower_expr(rhs, ExprCtx::RValue)?;
        let zero = self.const_int(0);
        let right_test = self.emit(
            InstKind::Cmp {
                op: CmpOp::Ne,
                lhs: right,
                rhs: zero,
            },
            IrType::Bool,
        );
        let result = self.widen_bool(right_test);
        self.emit(InstKind::Goto { target: l_end }, IrType::Void);

        self.emit(InstKind::Label(l_short), IrType::Void);
        let short_value = self.const_int(if is_or { 1 } else { 0 });
        self.emit(
            InstKind::Move {
                dst: result,
                src: short_value,
            },
            IrType::Void,
        );
        self.emit(InstKind::Goto { target: l_end }, IrType::Void);

        self.emit(InstKind::Label(l_end), IrType::Void);
        Ok(result)
    }

    fn lower_call(&mut self, callee: &str, args: &[Expr], line: usize) -> LowerResult<ValueRef> {
        let Some(callee_index) = self.module.find_function(callee) else {
            return Err(LowerError::UndefinedSymbol {
                name: callee.to_string(),
                line,
            });
        };
        let expected = self.module.functions[callee_index].params.len();
        if args.len() != expected {
            return Err(LowerError::ArgCountMismatch {
                callee: callee.to_string(),
                expected,
                found: args.len(),
                line,
            });
        }

        {
            let func = self.module.cur_func_mut();
            func.exists_call = true;
            if args.len() > func.max_call_arg_count {
                func.max_call_arg_count = args.len();
            }
        }

        // Arguments evaluate left-to-right; an array-name argument is
        // the array variable itself, which stands for its base address.
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.lower_expr(arg, ExprCtx::RValue)?);
        }
        for &value in &values {
            self.emit(InstKind::Arg { value }, IrType::Void);
        }

        let return_type = self.module.functions[callee_index].return_type.clone();
        Ok(self.emit(
            InstKind::Call {
                callee: callee_index,
                args: values,
            },
            return_type,
        ))
    }

    fn lower_array_access(
        &mut self,
        name: &str,
        indices: &[Expr],
        line: usize,
    ) -> LowerResult<ValueRef> {
        let (addr, remaining, elem) = self.lower_array_address(name, indices, line)?;
        if remaining.is_empty() {
            Ok(self.emit(InstKind::LoadArray { addr }, elem))
        } else {
            Ok(self.emit(
                InstKind::Slice { addr },
                IrType::Array {
                    elem: Box::new(elem),
                    dims: remaining,
                },
            ))
        }
    }

    /// Row-major address of `a[i1]..[ik]`: Horner's form over the
    /// declared sizes of dimensions 2..k, scaled by the remaining
    /// dimensions for a partial access, times 4 for the byte offset.
    fn lower_array_address(
        &mut self,
        name: &str,
        indices: &[Expr],
        line: usize,
    ) -> LowerResult<(ValueRef, Vec<i32>, IrType)> {
        let base = self
            .module
            .find_var_value(name)
            .ok_or_else(|| LowerError::UndefinedSymbol {
                name: name.to_string(),
                line,
            })?;
        let base_ty = {
            let func = self.module.cur_func();
            self.module.value_type(func, base)
        };
        let IrType::Array { elem, dims } = base_ty else {
            return Err(LowerError::InvalidArrayAccess {
                name: name.to_string(),
                line,
            });
        };
        if indices.is_empty() || indices.len() > dims.len() {
            return Err(LowerError::InvalidArrayAccess {
                name: name.to_string(),
                line,
            });
        }

        let mut index_values = Vec::with_capacity(indices.len());
        for index in indices {
            index_values.push(self.lower_expr(index, ExprCtx::RValue)?);
        }

        let mut offset = index_values[0];
        for j in 1..index_values.len() {
            let multiplier = self.const_int(dims[j]);
            let scaled = self.emit(
                InstKind::Binary {
                    op: BinaryOp::Mul,
                    lhs: offset,
                    rhs: multiplier,
                },
                IrType::Int32,
            );
            offset = self.emit(
                InstKind::Binary {
                    op: BinaryOp::Add,
                    lhs: scaled,
                    rhs: index_values[j],
                },
                IrType::Int32,
            );
        }

        let remaining: Vec<i32> = dims[indices.len()..].to_vec();
        if !remaining.is_empty() {
            let remaining_size: i32 = remaining.iter().product();
            if remaining_size > 1 {
                let size_value = self.const_int(remaining_size);
                offset = self.emit(
                    InstKind::Binary {
                        op: BinaryOp::Mul,
                        lhs: offset,
                        rhs: size_value,
                    },
                    IrType::Int32,
                );
            }
        }

        let element_size = self.const_int(4);
        let byte_offset = self.emit(
            InstKind::Binary {
                op: BinaryOp::Mul,
                lhs: offset,
                rhs: element_size,
            },
            IrType::Int32,
        );
        let addr = self.emit(
            InstKind::PtrAdd {
                base,
                offset: byte_offset,
            },
            IrType::pointer_to((*elem).clone()),
        );
        Ok((addr, remaining, *elem))
    }

    /// Branch on the i1, write 1 or 0 into a fresh i32 local, rejoin.
    /// Returns the local.
    fn widen_bool(&mut self, cond: ValueRef) -> ValueRef {
        let result = self.module.new_var_value(IrType::Int32, None);
        let l_true = self.new_label();
        let l_false = self.new_label();
        let l_end = self.new_label();

        self.emit(
            InstKind::CondGoto {
                cond,
                if_true: l_true,
                if_false: l_false,
            },
            IrType::Void,
        );

        self.emit(InstKind::Label(l_true), IrType::Void);
        let one = self.const_int(1);
        self.emit(
            InstKind::Move {
                dst: result,
                src: one,
            },
            IrType::Void,
        );
        self.emit(InstKind::Goto { target: l_end }, IrType::Void);

        self.emit(InstKind::Label(l_false), IrType::Void);
        let zero = self.const_int(0);
        self.emit(
            InstKind::Move {
                dst: result,
                src: zero,
            },
            IrType::Void,
        );
        self.emit(InstKind::Goto { target: l_end }, IrType::Void);

        self.emit(InstKind::Label(l_end), IrType::Void);
        result
    }

    fn emit(&mut self, kind: InstKind, ty: IrType) -> ValueRef {
        self.module.cur_func_mut().emit(kind, ty)
    }

    fn new_label(&mut self) -> LabelId {
        self.module.cur_func_mut().new_label()
    }

    fn const_int(&mut self, value: i32) -> ValueRef {
        self.module.new_const_int(value)
    }
}

/// Constant evaluation for contexts that cannot emit instructions:
/// global initializers, global array dimensions, parameter dimensions.
fn const_eval(expr: &Expr) -> Option<i32> {
    match expr {
        Expr::LiteralUint { value, .. } => Some(*value),
        Expr::Unary {
            op: UnOp::Neg,
            operand,
            ..
        } => const_eval(operand).map(|v| v.wrapping_neg()),
        _ => None,
    }
}
