use std::collections::HashMap;
use std::fmt;

/// IR-level types. `Bool` is the one-bit result of a comparison; array
/// dimensions are fixed at declaration time. The leading dimension of an
/// array *parameter* may be 0, meaning it was erased in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrType {
    Void,
    Int32,
    Bool,
    Pointer(Box<IrType>),
    Array { elem: Box<IrType>, dims: Vec<i32> },
}

impl IrType {
    pub fn size(&self) -> i32 {
        match self {
            IrType::Void => 0,
            IrType::Int32 => 4,
            IrType::Bool => 1,
            IrType::Pointer(_) => 4,
            IrType::Array { elem, dims } => dims.iter().product::<i32>() * elem.size(),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, IrType::Array { .. })
    }

    pub fn array_of(dims: Vec<i32>) -> IrType {
        IrType::Array {
            elem: Box::new(IrType::Int32),
            dims,
        }
    }

    pub fn pointer_to(elem: IrType) -> IrType {
        IrType::Pointer(Box::new(elem))
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Void => write!(f, "void"),
            IrType::Int32 => write!(f, "i32"),
            IrType::Bool => write!(f, "i1"),
            IrType::Pointer(inner) => write!(f, "{}*", inner),
            IrType::Array { elem, dims } => {
                write!(f, "{}", elem)?;
                for dim in dims {
                    write!(f, "[{}]", dim)?;
                }
                Ok(())
            }
        }
    }
}

/// A reference to an IR value. Constants and globals are module-scoped;
/// parameters, locals and instruction results are scoped to the function
/// they were created in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueRef {
    Const(usize),
    Global(usize),
    Param(usize),
    Local(usize),
    Temp(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalVariable {
    pub name: String,
    pub ty: IrType,
    pub init: Option<i32>,
}

impl GlobalVariable {
    /// Uninitialized and zero-initialized globals live in BSS.
    pub fn is_bss(&self) -> bool {
        matches!(self.init, None | Some(0))
    }

    pub fn ir_name(&self) -> String {
        format!("@{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormalParam {
    pub name: String,
    pub ty: IrType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariable {
    pub name: Option<String>,
    pub ty: IrType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelId(pub u32);

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".L{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Mod => "mod",
        };
        write!(f, "{op_str}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
}

impl CmpOp {
    /// ARM condition-code suffix for the operator.
    pub fn cond_suffix(&self) -> &'static str {
        match self {
            CmpOp::Lt => "lt",
            CmpOp::Gt => "gt",
            CmpOp::Le => "le",
            CmpOp::Ge => "ge",
            CmpOp::Eq => "eq",
            CmpOp::Ne => "ne",
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "icmp_{}", self.cond_suffix())
    }
}

/// One linear IR instruction. Goto is either unconditional (one target)
/// or conditional (an i1/i32 condition plus two targets). `Slice` and
/// `Arg` are zero-cost carriers: they emit no IR text of their own.
#[derive(Debug, Clone, PartialEq)]
pub enum InstKind {
    Entry,
    Exit {
        value: Option<ValueRef>,
    },
    Label(LabelId),
    Goto {
        target: LabelId,
    },
    CondGoto {
        cond: ValueRef,
        if_true: LabelId,
        if_false: LabelId,
    },
    Move {
        dst: ValueRef,
        src: ValueRef,
    },
    Binary {
        op: BinaryOp,
        lhs: ValueRef,
        rhs: ValueRef,
    },
    Cmp {
        op: CmpOp,
        lhs: ValueRef,
        rhs: ValueRef,
    },
    /// Pointer arithmetic: base address plus a byte offset. Kept apart
    /// from integer `add` so the pointer-typed result is explicit.
    PtrAdd {
        base: ValueRef,
        offset: ValueRef,
    },
    Arg {
        value: ValueRef,
    },
    Call {
        callee: usize,
        args: Vec<ValueRef>,
    },
    LoadArray {
        addr: ValueRef,
    },
    StoreArray {
        value: ValueRef,
        addr: ValueRef,
    },
    /// Partial array access: carries the element address typed as the
    /// remaining-dimensions sub-array. Prints as the address it wraps.
    Slice {
        addr: ValueRef,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Inst {
    pub kind: InstKind,
    pub ty: IrType,
    /// `%tN` number when the instruction defines a temporary.
    pub temp: Option<u32>,
    pub dead: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrFunction {
    pub name: String,
    pub return_type: IrType,
    pub params: Vec<FormalParam>,
    pub locals: Vec<LocalVariable>,
    pub body: Vec<Inst>,
    pub exit_label: LabelId,
    pub return_slot: Option<usize>,
    pub max_call_arg_count: usize,
    pub exists_call: bool,
    next_label: u32,
    next_temp: u32,
}

impl IrFunction {
    fn new(name: String, return_type: IrType) -> Self {
        let mut func = Self {
            name,
            return_type,
            params: Vec::new(),
            locals: Vec::new(),
            body: Vec::new(),
            exit_label: LabelId(0),
            return_slot: None,
            max_call_arg_count: 0,
            exists_call: false,
            next_label: 0,
            next_temp: 0,
        };
        func.exit_label = func.new_label();
        func
    }

    pub fn new_label(&mut self) -> LabelId {
        let label = LabelId(self.next_label);
        self.next_label += 1;
        label
    }

    /// Append an instruction, assigning a `%tN` name when it defines a
    /// value. Returns a reference to the instruction's result.
    pub fn emit(&mut self, kind: InstKind, ty: IrType) -> ValueRef {
        let produces = match &kind {
            InstKind::Binary { .. }
            | InstKind::Cmp { .. }
            | InstKind::PtrAdd { .. }
            | InstKind::LoadArray { .. } => true,
            InstKind::Call { .. } => ty != IrType::Void,
            _ => false,
        };
        let temp = if produces {
            let id = self.next_temp;
            self.next_temp += 1;
            Some(id)
        } else {
            None
        };
        self.body.push(Inst {
            kind,
            ty,
            temp,
            dead: false,
        });
        ValueRef::Temp(self.body.len() - 1)
    }

    /// IR name of a local. Parameters take `%l0..` in declaration order
    /// and locals continue the same counter.
    pub fn local_name(&self, index: usize) -> String {
        format!("%l{}", self.params.len() + index)
    }

    pub fn param_name(&self, index: usize) -> String {
        format!("%l{}", index)
    }
}

#[derive(Debug)]
pub struct Module {
    pub globals: Vec<GlobalVariable>,
    pub functions: Vec<IrFunction>,
    const_pool: Vec<i32>,
    const_index: HashMap<i32, usize>,
    scopes: Vec<HashMap<String, ValueRef>>,
    current: Option<usize>,
}

impl Module {
    pub fn new() -> Self {
        Self {
            globals: Vec::new(),
            functions: Vec::new(),
            const_pool: Vec::new(),
            const_index: HashMap::new(),
            scopes: vec![HashMap::new()],
            current: None,
        }
    }

    /// Interned integer constant.
    pub fn new_const_int(&mut self, value: i32) -> ValueRef {
        if let Some(&index) = self.const_index.get(&value) {
            return ValueRef::Const(index);
        }
        let index = self.const_pool.len();
        self.const_pool.push(value);
        self.const_index.insert(value, index);
        ValueRef::Const(index)
    }

    pub fn const_value(&self, v: ValueRef) -> Option<i32> {
        match v {
            ValueRef::Const(index) => Some(self.const_pool[index]),
            _ => None,
        }
    }

    pub fn new_function(&mut self, name: &str, return_type: IrType) -> usize {
        self.functions
            .push(IrFunction::new(name.to_string(), return_type));
        self.functions.len() - 1
    }

    pub fn find_function(&self, name: &str) -> Option<usize> {
        self.functions.iter().position(|f| f.name == name)
    }

    pub fn set_current_function(&mut self, func: Option<usize>) {
        self.current = func;
    }

    pub fn current_function(&self) -> Option<usize> {
        self.current
    }

    pub fn cur_func(&self) -> &IrFunction {
        &self.functions[self.current.expect("no current function")]
    }

    pub fn cur_func_mut(&mut self) -> &mut IrFunction {
        let index = self.current.expect("no current function");
        &mut self.functions[index]
    }

    /// Create a variable: a local of the current function, or a global
    /// when no function is active. Named variables are registered in the
    /// innermost scope; anonymous ones only get a synthetic `%lN` name.
    pub fn new_var_value(&mut self, ty: IrType, name: Option<&str>) -> ValueRef {
        if let Some(func_index) = self.current {
            let func = &mut self.functions[func_index];
            func.locals.push(LocalVariable {
                name: name.map(|s| s.to_string()),
                ty,
            });
            let value = ValueRef::Local(func.locals.len() - 1);
            if let Some(name) = name {
                self.define_in_scope(name, value);
            }
            value
        } else {
            let name = name.expect("global variables must be named");
            self.globals.push(GlobalVariable {
                name: name.to_string(),
                ty,
                init: None,
            });
            let value = ValueRef::Global(self.globals.len() - 1);
            self.define_in_scope(name, value);
            value
        }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn leave_scope(&mut self) {
        self.scopes.pop();
    }

    fn define_in_scope(&mut self, name: &str, value: ValueRef) {
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .insert(name.to_string(), value);
    }

    /// Symbol lookup from the innermost scope outward.
    pub fn find_var_value(&self, name: &str) -> Option<ValueRef> {
        for scope in self.scopes.iter().rev() {
            if let Some(&value) = scope.get(name) {
                return Some(value);
            }
        }
        None
    }

    pub fn value_type(&self, func: &IrFunction, v: ValueRef) -> IrType {
        match v {
            ValueRef::Const(_) => IrType::Int32,
            ValueRef::Global(index) => self.globals[index].ty.clone(),
            ValueRef::Param(index) => func.params[index].ty.clone(),
            ValueRef::Local(index) => func.locals[index].ty.clone(),
            ValueRef::Temp(index) => func.body[index].ty.clone(),
        }
    }

    /// Printable IR name of a value in the context of `func`.
    pub fn value_name(&self, func: &IrFunction, v: ValueRef) -> String {
        match v {
            ValueRef::Const(index) => format!("#{}", self.const_pool[index]),
            ValueRef::Global(index) => self.globals[index].ir_name(),
            ValueRef::Param(index) => func.param_name(index),
            ValueRef::Local(index) => func.local_name(index),
            ValueRef::Temp(index) => {
                let inst = &func.body[index];
                match &inst.kind {
                    InstKind::Slice { addr } => self.value_name(func, *addr),
                    InstKind::Move { dst, .. } => self.value_name(func, *dst),
                    _ => match inst.temp {
                        Some(id) => format!("%t{}", id),
                        None => String::new(),
                    },
                }
            }
        }
    }
}
