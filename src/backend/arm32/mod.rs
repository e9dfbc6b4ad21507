pub mod error;
pub mod iloc;
pub mod isel;
pub mod platform;
pub mod regalloc;

#[cfg(test)]
mod tests;

use crate::backend::arm32::error::BackendError;
use crate::backend::arm32::isel::InstSelectorArm32;
use crate::middleend::ir::module::Module;

/// Generate ARM32 assembly for a whole module: globals into `.data` and
/// `.bss`, functions into `.text`. Backend errors are collected and
/// returned alongside the best-effort output.
pub fn generate_assembly(module: &Module, show_ir: bool) -> (String, Vec<BackendError>) {
    let mut lines: Vec<String> = Vec::new();
    let mut errors: Vec<BackendError> = Vec::new();

    let has_data = module.globals.iter().any(|g| !g.is_bss());
    if has_data {
        lines.push("\t.data".to_string());
        for global in module.globals.iter().filter(|g| !g.is_bss()) {
            lines.push("\t.align 2".to_string());
            lines.push(format!("\t.global {}", global.name));
            lines.push(format!("{}:", global.name));
            lines.push(format!("\t.word {}", global.init.unwrap_or(0)));
        }
    }

    let has_bss = module.globals.iter().any(|g| g.is_bss());
    if has_bss {
        lines.push("\t.bss".to_string());
        for global in module.globals.iter().filter(|g| g.is_bss()) {
            lines.push("\t.align 2".to_string());
            lines.push(format!("\t.global {}", global.name));
            lines.push(format!("{}:", global.name));
            lines.push(format!("\t.skip {}", global.ty.size().max(4)));
        }
    }

    lines.push("\t.text".to_string());
    for func in &module.functions {
        lines.push(format!("\t.global {}", func.name));
        lines.push("\t.align 2".to_string());
        lines.push(format!("{}:", func.name));

        let mut selector = InstSelectorArm32::new(module, func, show_ir);
        selector.run();
        let (body, func_errors) = selector.finish();
        lines.extend(body);
        errors.extend(func_errors);
    }

    (lines.join("\n") + "\n", errors)
}
