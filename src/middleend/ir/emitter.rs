use crate::middleend::ir::module::{Inst, InstKind, IrFunction, IrType, Module};
use std::fmt::Write;

/// Render a module as linear IR text, one instruction per line.
pub fn emit_module(module: &Module) -> String {
    let mut emitter = IrEmitter::new();
    emitter.emit_module(module);
    emitter.finish()
}

struct IrEmitter {
    output: String,
}

impl IrEmitter {
    fn new() -> Self {
        Self {
            output: String::new(),
        }
    }

    fn finish(self) -> String {
        self.output
    }

    fn emit_module(&mut self, module: &Module) {
        for global in &module.globals {
            let mut line = match &global.ty {
                IrType::Array { elem, dims } => {
                    let mut name = global.ir_name();
                    for dim in dims {
                        name.push_str(&format!("[{}]", dim));
                    }
                    format!("declare {} {}", elem, name)
                }
                ty => format!("declare {} {}", ty, global.ir_name()),
            };
            if let Some(init) = global.init {
                let _ = write!(line, " = #{}", init);
            }
            let _ = writeln!(self.output, "{}", line);
        }
        if !module.globals.is_empty() {
            self.output.push('\n');
        }

        for (index, func) in module.functions.iter().enumerate() {
            self.emit_function(module, func);
            if index + 1 < module.functions.len() {
                self.output.push('\n');
            }
        }
    }

    fn emit_function(&mut self, module: &Module, func: &IrFunction) {
        let params = func
            .params
            .iter()
            .enumerate()
            .map(|(index, param)| match &param.ty {
                // Array parameters print with a trailing star: the value
                // passed is the base address.
                IrType::Array { elem, .. } => format!("{} {}*", elem, func.param_name(index)),
                ty => format!("{} {}", ty, func.param_name(index)),
            })
            .collect::<Vec<_>>()
            .join(", ");

        let _ = writeln!(
            self.output,
            "define {} @{}({}) {{",
            func.return_type, func.name, params
        );

        for (index, local) in func.locals.iter().enumerate() {
            let line = match &local.ty {
                IrType::Array { elem, dims } => {
                    let mut name = func.local_name(index);
                    for dim in dims {
                        name.push_str(&format!("[{}]", dim));
                    }
                    format!("declare {} {}", elem, name)
                }
                ty => format!("declare {} {}", ty, func.local_name(index)),
            };
            let _ = writeln!(self.output, "\t{}", line);
        }

        for inst in &func.body {
            if let Some(line) = format_inst(module, func, inst) {
                let _ = writeln!(self.output, "\t{}", line);
            }
        }

        self.output.push_str("}\n");
    }
}

/// One line of IR text, or `None` for the zero-cost carriers.
pub fn format_inst(module: &Module, func: &IrFunction, inst: &Inst) -> Option<String> {
    let name = |v| module.value_name(func, v);
    match &inst.kind {
        InstKind::Entry => Some("entry:".to_string()),
        InstKind::Exit { value } => match value {
            Some(v) => Some(format!("exit {}", name(*v))),
            None => Some("exit".to_string()),
        },
        InstKind::Label(label) => Some(format!("{}:", label)),
        InstKind::Goto { target } => Some(format!("br label {}", target)),
        InstKind::CondGoto {
            cond,
            if_true,
            if_false,
        } => Some(format!(
            "bc {}, label {}, label {}",
            name(*cond),
            if_true,
            if_false
        )),
        InstKind::Move { dst, src } => Some(format!("{} = {}", name(*dst), name(*src))),
        InstKind::Binary { op, lhs, rhs } => {
            let result = inst.temp.map(|id| format!("%t{}", id)).unwrap_or_default();
            Some(format!("{} = {} {}, {}", result, op, name(*lhs), name(*rhs)))
        }
        InstKind::Cmp { op, lhs, rhs } => {
            let result = inst.temp.map(|id| format!("%t{}", id)).unwrap_or_default();
            Some(format!("{} = {} {}, {}", result, op, name(*lhs), name(*rhs)))
        }
        InstKind::PtrAdd { base, offset } => {
            let result = inst.temp.map(|id| format!("%t{}", id)).unwrap_or_default();
            Some(format!(
                "{} = ptradd {}, {}",
                result,
                name(*base),
                name(*offset)
            ))
        }
        InstKind::Arg { .. } => None,
        InstKind::Call { callee, args } => {
            let callee_func = &module.functions[*callee];
            let args_str = args
                .iter()
                .map(|&arg| name(arg))
                .collect::<Vec<_>>()
                .join(", ");
            match inst.temp {
                Some(id) => Some(format!(
                    "%t{} = call {} @{}({})",
                    id, inst.ty, callee_func.name, args_str
                )),
                None => Some(format!("call void @{}({})", callee_func.name, args_str)),
            }
        }
        InstKind::LoadArray { addr } => {
            let result = inst.temp.map(|id| format!("%t{}", id)).unwrap_or_default();
            Some(format!("{} = *{}", result, name(*addr)))
        }
        InstKind::StoreArray { value, addr } => {
            Some(format!("*{} = {}", name(*addr), name(*value)))
        }
        InstKind::Slice { .. } => None,
    }
}
