//! Native code generation for hotkey actions.
//!
//! [`CodeGenerator`] lowers one action (a statement or expression) to a
//! standalone machine-code function with Cranelift. The generated function
//! takes a pointer to a [`runtime::Frame`] and returns a value handle.
//!
//! Control flow (`if`, `while`, `and`/`or`, `return`) is emitted natively.
//! Values stay opaque to generated code: constants, operators and builtin
//! calls go through the helpers in [`runtime`], which apply exactly the same
//! operator and call semantics as the interpreter.
//!
//! Names are resolved while compiling. An unknown identifier, module or
//! function, a bad pipeline stage or a wrong argument count is a
//! [`CompileError`]; nothing falls back to interpretation.
//!
//! The exception is a name that some `let` in the action assigns. Whether it
//! is bound depends on the path taken, so every such variable starts out as
//! [`UNDEFINED`](runtime::UNDEFINED) and each read checks it: an unassigned
//! read resolves the name as a builtin at that point, or fails with the error
//! the interpreter would raise.

pub mod runtime;

use std::{collections::HashMap, sync::Arc};

use cranelift::prelude::{
    AbiParam, Block, FunctionBuilder, FunctionBuilderContext, InstBuilder, IntCC,
    Value as IrValue, Variable, types,
};
use cranelift::codegen::ir::FuncRef;
use cranelift_jit::{JITBuilder, JITModule};
use cranelift_module::{FuncId, Linkage, Module};

use crate::{
    ast::{BinOp, Expr, Statement},
    environment::{Builtin, ModuleRegistry},
    error::RuntimeError,
    host::Host,
    value::Value,
};

use self::runtime::{FAILED, Frame, HELPERS, MAX_CALL_ARGS, NULL_HANDLE, UNDEFINED};

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// Name resolution failed; carries the error the interpreter would raise
    #[error(transparent)]
    Resolution(#[from] RuntimeError),

    /// Construct with no native lowering (nested bindings, `fn`)
    #[error("unsupported in compiled actions: {0}")]
    Unsupported(String),

    /// Backend failure, including IR verification
    #[error(transparent)]
    Module(#[from] cranelift_module::ModuleError),

    #[error("missing return value from helper {0}")]
    MissingReturnValue(&'static str),
}

/// `let` names of one action mapped to Cranelift variables.
///
/// Temporaries used to merge branch results are allocated from the same
/// counter.
#[derive(Debug, Default)]
pub struct SymbolTable {
    variables: HashMap<String, Variable>,
    next: u32,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, name: &str) -> Option<Variable> {
        self.variables.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    fn fresh(&mut self, builder: &mut FunctionBuilder) -> Variable {
        let var = Variable::from_u32(self.next);
        self.next += 1;
        builder.declare_var(var, types::I64);
        var
    }

    fn declare(&mut self, name: &str, builder: &mut FunctionBuilder) -> Variable {
        if let Some(var) = self.lookup(name) {
            return var;
        }
        let var = self.fresh(builder);
        self.variables.insert(name.to_string(), var);
        var
    }
}

/// A compiled action, ready to be invoked any number of times.
///
/// Owns the machine code; the memory is released when the function is
/// dropped.
pub struct NativeFunction {
    module: Option<JITModule>,
    func_id: FuncId,
    constants: Vec<Value>,
    failures: Vec<RuntimeError>,
    registry: Arc<ModuleRegistry>,
}

impl NativeFunction {
    /// Runs the action against `host`.
    pub fn invoke(&self, host: &dyn Host) -> Result<Value, RuntimeError> {
        let Some(module) = &self.module else {
            return Err(RuntimeError::Host("native function already released".to_string()));
        };
        let mut frame = Frame::new(host, &self.registry, &self.constants, &self.failures);

        let entry = unsafe {
            let raw = module.get_finalized_function(self.func_id);
            std::mem::transmute::<*const u8, unsafe extern "C" fn(*mut Frame<'_>) -> i64>(raw)
        };
        let handle = unsafe { entry(&mut frame) };
        frame.finish(handle)
    }

    /// Entries in the constant pool.
    pub fn constant_count(&self) -> usize {
        self.constants.len()
    }
}

impl Drop for NativeFunction {
    fn drop(&mut self) {
        if let Some(module) = self.module.take() {
            // No caller can still hold the entry point: `invoke` borrows self.
            unsafe { module.free_memory() };
        }
    }
}

/// Lowers actions to native functions.
///
/// Holds the shared module registry; every call to
/// [`compile_statement`](Self::compile_statement) produces an independent
/// [`NativeFunction`].
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    registry: Arc<ModuleRegistry>,
}

impl CodeGenerator {
    pub fn new(registry: Arc<ModuleRegistry>) -> Self {
        CodeGenerator { registry }
    }

    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    pub fn compile_expression(&self, expr: &Expr) -> Result<NativeFunction, CompileError> {
        self.compile_statement(&Statement::Expression(expr.clone()))
    }

    /// Compiles `stmt` into a native function returning the statement's value.
    pub fn compile_statement(&self, stmt: &Statement) -> Result<NativeFunction, CompileError> {
        let mut jit_builder = JITBuilder::new(cranelift_module::default_libcall_names())?;
        runtime::register_symbols(&mut jit_builder);
        let mut module = JITModule::new(jit_builder);

        let pointer = module.target_config().pointer_type();
        let mut helper_ids = Vec::with_capacity(HELPERS.len());
        for (name, params) in HELPERS {
            let mut sig = module.make_signature();
            sig.params.push(AbiParam::new(pointer));
            for _ in 0..params {
                sig.params.push(AbiParam::new(types::I64));
            }
            sig.returns.push(AbiParam::new(types::I64));
            helper_ids.push(module.declare_function(name, Linkage::Import, &sig)?);
        }

        let mut ctx = module.make_context();
        ctx.func.signature.params.push(AbiParam::new(pointer));
        ctx.func.signature.returns.push(AbiParam::new(types::I64));

        let mut func_ctx = FunctionBuilderContext::new();
        let (constants, failures) = {
            let mut builder = FunctionBuilder::new(&mut ctx.func, &mut func_ctx);
            let entry = builder.create_block();
            builder.append_block_params_for_function_params(entry);
            builder.switch_to_block(entry);

            let frame = builder.block_params(entry)[0];
            let abort = builder.create_block();
            let helpers: Vec<FuncRef> = helper_ids
                .iter()
                .map(|id| module.declare_func_in_func(*id, builder.func))
                .collect();

            let mut translator = Translator {
                builder: &mut builder,
                registry: &self.registry,
                frame,
                abort,
                helpers,
                symbols: SymbolTable::new(),
                constants: Vec::new(),
                failures: Vec::new(),
            };
            translator.declare_locals(stmt);
            let result = translator.statement(stmt)?;
            translator.builder.ins().return_(&[result]);

            translator.builder.switch_to_block(abort);
            let failed = translator.builder.ins().iconst(types::I64, FAILED);
            translator.builder.ins().return_(&[failed]);

            log::debug!(
                "lowered action with {} variable(s), {} constant(s)",
                translator.symbols.len(),
                translator.constants.len()
            );
            let pools = (translator.constants, translator.failures);
            builder.seal_all_blocks();
            builder.finalize();
            pools
        };

        let func_id = module.declare_function("hotkey_action", Linkage::Export, &ctx.func.signature)?;
        module.define_function(func_id, &mut ctx)?;
        module.clear_context(&mut ctx);
        module.finalize_definitions()?;

        Ok(NativeFunction {
            module: Some(module),
            func_id,
            constants,
            failures,
            registry: Arc::clone(&self.registry),
        })
    }
}

/// Indices into `Translator::helpers`, in [`HELPERS`] order.
#[derive(Debug, Clone, Copy)]
enum Helper {
    Const = 0,
    Bool = 1,
    Truthy = 2,
    Binary = 3,
    Call = 4,
    Raise = 5,
}

impl Helper {
    fn name(self) -> &'static str {
        HELPERS[self as usize].0
    }
}

struct Translator<'a, 'b> {
    builder: &'a mut FunctionBuilder<'b>,
    registry: &'a ModuleRegistry,
    frame: IrValue,
    abort: Block,
    helpers: Vec<FuncRef>,
    symbols: SymbolTable,
    constants: Vec<Value>,
    failures: Vec<RuntimeError>,
}

/// Every name assigned by a `let` anywhere in `stmt`, in first-seen order.
fn let_names<'s>(stmt: &'s Statement, names: &mut Vec<&'s str>) {
    match stmt {
        Statement::Let { name, .. } => {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        Statement::Block(statements) => {
            for stmt in statements {
                let_names(stmt, names);
            }
        }
        Statement::If {
            consequence,
            alternative,
            ..
        } => {
            let_names(consequence, names);
            if let Some(alt) = alternative {
                let_names(alt, names);
            }
        }
        Statement::While { body, .. } => let_names(body, names),
        _ => {}
    }
}

impl<'a, 'b> Translator<'a, 'b> {
    /// Declares every `let` variable of the action as [`UNDEFINED`]. Must run
    /// in the entry block.
    fn declare_locals(&mut self, stmt: &Statement) {
        let mut names = Vec::new();
        let_names(stmt, &mut names);
        for name in names {
            let var = self.symbols.declare(name, self.builder);
            let undefined = self.builder.ins().iconst(types::I64, UNDEFINED);
            self.builder.def_var(var, undefined);
        }
    }

    fn statement(&mut self, stmt: &Statement) -> Result<IrValue, CompileError> {
        match stmt {
            Statement::HotkeyBinding { .. } => Err(CompileError::Unsupported(
                "hotkey binding inside an action".to_string(),
            )),
            Statement::Function(decl) => Err(CompileError::Unsupported(format!(
                "function declaration '{}'",
                decl.name
            ))),
            Statement::Block(statements) => {
                let mut last = self.null();
                for stmt in statements {
                    last = self.statement(stmt)?;
                }
                Ok(last)
            }
            Statement::Expression(expr) => self.expression(expr),
            Statement::Let { name, value } => {
                let handle = match value {
                    Some(expr) => self.expression(expr)?,
                    None => self.null(),
                };
                let var = self.symbols.declare(name, self.builder);
                self.builder.def_var(var, handle);
                Ok(handle)
            }
            Statement::If {
                condition,
                consequence,
                alternative,
            } => {
                let truthy = self.truthy(condition)?;
                let result = self.symbols.fresh(self.builder);
                let then_block = self.builder.create_block();
                let else_block = self.builder.create_block();
                let merge_block = self.builder.create_block();

                self.builder
                    .ins()
                    .brif(truthy, then_block, &[], else_block, &[]);

                self.builder.switch_to_block(then_block);
                let value = self.statement(consequence)?;
                self.builder.def_var(result, value);
                self.builder.ins().jump(merge_block, &[]);

                self.builder.switch_to_block(else_block);
                let value = match alternative {
                    Some(alt) => self.statement(alt)?,
                    None => self.null(),
                };
                self.builder.def_var(result, value);
                self.builder.ins().jump(merge_block, &[]);

                self.builder.switch_to_block(merge_block);
                Ok(self.builder.use_var(result))
            }
            Statement::While { condition, body } => {
                let header = self.builder.create_block();
                let body_block = self.builder.create_block();
                let exit = self.builder.create_block();

                self.builder.ins().jump(header, &[]);

                self.builder.switch_to_block(header);
                let truthy = self.truthy(condition)?;
                self.builder.ins().brif(truthy, body_block, &[], exit, &[]);

                self.builder.switch_to_block(body_block);
                self.statement(body)?;
                self.builder.ins().jump(header, &[]);

                self.builder.switch_to_block(exit);
                Ok(self.null())
            }
            Statement::Return(value) => {
                let handle = match value {
                    Some(expr) => self.expression(expr)?,
                    None => self.null(),
                };
                self.builder.ins().return_(&[handle]);

                // Anything after the return is unreachable but still needs a block.
                let dead = self.builder.create_block();
                self.builder.switch_to_block(dead);
                Ok(self.null())
            }
        }
    }

    fn expression(&mut self, expr: &Expr) -> Result<IrValue, CompileError> {
        match expr {
            Expr::Number(n) => self.constant(Value::from_number(*n)),
            Expr::String(s) | Expr::Hotkey(s) => self.constant(Value::String(s.clone())),
            Expr::Identifier(name) => {
                if let Some(var) = self.symbols.lookup(name) {
                    return self.read_local(expr, var);
                }
                let builtin = self.resolve(expr)?;
                self.call(&builtin, &[])
            }
            Expr::Member { .. } => {
                let builtin = self.resolve(expr)?;
                self.call(&builtin, &[])
            }
            Expr::Binary { left, op, right } => match op {
                BinOp::And | BinOp::Or => self.short_circuit(*op, left, right),
                _ => {
                    let l = self.expression(left)?;
                    let r = self.expression(right)?;
                    let code = self.builder.ins().iconst(types::I64, op.code());
                    self.helper(Helper::Binary, &[code, l, r], true)
                }
            },
            Expr::Call { callee, args } => {
                let builtin = self.resolve(callee)?;
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.expression(arg)?);
                }
                self.call(&builtin, &values)
            }
            Expr::Pipeline(stages) => {
                let Some((first, rest)) = stages.split_first() else {
                    return Ok(self.null());
                };
                let mut acc = self.expression(first)?;
                for stage in rest {
                    acc = self.stage(stage, acc)?;
                }
                Ok(acc)
            }
        }
    }

    fn stage(&mut self, stage: &Expr, input: IrValue) -> Result<IrValue, CompileError> {
        match stage {
            Expr::Call { callee, args } => {
                let builtin = self.resolve(callee)?;
                let mut values = Vec::with_capacity(args.len() + 1);
                values.push(input);
                for arg in args {
                    values.push(self.expression(arg)?);
                }
                self.call(&builtin, &values)
            }
            Expr::Identifier(_) | Expr::Member { .. } => {
                let builtin = self.resolve(stage)?;
                if builtin.arity == 0 {
                    self.call(&builtin, &[])
                } else {
                    self.call(&builtin, &[input])
                }
            }
            other => Err(RuntimeError::InvalidPipelineStage(other.to_string()).into()),
        }
    }

    /// Reads a `let` variable, resolving the name like an unbound identifier
    /// when no assignment has run yet.
    fn read_local(&mut self, expr: &Expr, var: Variable) -> Result<IrValue, CompileError> {
        let current = self.builder.use_var(var);
        let result = self.symbols.fresh(self.builder);
        self.builder.def_var(result, current);

        let unbound = self.builder.ins().icmp_imm(IntCC::Equal, current, UNDEFINED);
        let fallback = self.builder.create_block();
        let merge = self.builder.create_block();
        self.builder.ins().brif(unbound, fallback, &[], merge, &[]);

        self.builder.switch_to_block(fallback);
        let value = match self.resolve(expr).and_then(|builtin| self.call(&builtin, &[])) {
            Ok(value) => value,
            Err(CompileError::Resolution(error)) => self.raise(error)?,
            Err(other) => return Err(other),
        };
        self.builder.def_var(result, value);
        self.builder.ins().jump(merge, &[]);

        self.builder.switch_to_block(merge);
        Ok(self.builder.use_var(result))
    }

    /// Emits an unconditional failure with `error`.
    fn raise(&mut self, error: RuntimeError) -> Result<IrValue, CompileError> {
        let index = self.failures.len() as i64;
        self.failures.push(error);
        let index = self.builder.ins().iconst(types::I64, index);
        self.helper(Helper::Raise, &[index], true)
    }

    fn resolve(&self, callee: &Expr) -> Result<Builtin, CompileError> {
        let builtin = match callee {
            Expr::Identifier(name) => self
                .registry
                .lookup_global(name)
                .copied()
                .ok_or_else(|| RuntimeError::UnknownIdentifier(name.clone()))?,
            Expr::Member { object, property } => match (object.as_ref(), property.as_ref()) {
                (Expr::Identifier(module), Expr::Identifier(function)) => {
                    *self.registry.lookup(module, function)?
                }
                (object, _) => return Err(RuntimeError::UnknownModule(object.to_string()).into()),
            },
            other => return Err(RuntimeError::UnknownIdentifier(other.to_string()).into()),
        };
        Ok(builtin)
    }

    fn call(&mut self, builtin: &Builtin, args: &[IrValue]) -> Result<IrValue, CompileError> {
        if args.len() != builtin.arity {
            return Err(RuntimeError::ArityMismatch {
                function: builtin.qualified_name(),
                expected: builtin.arity,
                found: args.len(),
            }
            .into());
        }
        if args.len() > MAX_CALL_ARGS {
            return Err(CompileError::Unsupported(format!(
                "call to {} with more than {} arguments",
                builtin.qualified_name(),
                MAX_CALL_ARGS
            )));
        }

        let mut operands = Vec::with_capacity(2 + MAX_CALL_ARGS);
        operands.push(self.builder.ins().iconst(types::I64, builtin.id as i64));
        operands.push(self.builder.ins().iconst(types::I64, args.len() as i64));
        operands.extend_from_slice(args);
        while operands.len() < 2 + MAX_CALL_ARGS {
            operands.push(self.builder.ins().iconst(types::I64, NULL_HANDLE));
        }
        self.helper(Helper::Call, &operands, true)
    }

    /// `and`/`or` with native branching; the right side only runs when needed.
    fn short_circuit(&mut self, op: BinOp, left: &Expr, right: &Expr) -> Result<IrValue, CompileError> {
        let left_truthy = self.truthy(left)?;
        let result = self.symbols.fresh(self.builder);
        let rhs_block = self.builder.create_block();
        let short_block = self.builder.create_block();
        let merge_block = self.builder.create_block();

        if op == BinOp::And {
            self.builder
                .ins()
                .brif(left_truthy, rhs_block, &[], short_block, &[]);
        } else {
            self.builder
                .ins()
                .brif(left_truthy, short_block, &[], rhs_block, &[]);
        }

        self.builder.switch_to_block(rhs_block);
        let right_truthy = self.truthy(right)?;
        let value = self.helper(Helper::Bool, &[right_truthy], false)?;
        self.builder.def_var(result, value);
        self.builder.ins().jump(merge_block, &[]);

        self.builder.switch_to_block(short_block);
        let flag = self
            .builder
            .ins()
            .iconst(types::I64, if op == BinOp::Or { 1 } else { 0 });
        let value = self.helper(Helper::Bool, &[flag], false)?;
        self.builder.def_var(result, value);
        self.builder.ins().jump(merge_block, &[]);

        self.builder.switch_to_block(merge_block);
        Ok(self.builder.use_var(result))
    }

    /// Evaluates `expr` and returns its truthiness as 0 or 1.
    fn truthy(&mut self, expr: &Expr) -> Result<IrValue, CompileError> {
        let handle = self.expression(expr)?;
        self.helper(Helper::Truthy, &[handle], false)
    }

    fn constant(&mut self, value: Value) -> Result<IrValue, CompileError> {
        let index = self.constants.len() as i64;
        self.constants.push(value);
        let index = self.builder.ins().iconst(types::I64, index);
        self.helper(Helper::Const, &[index], false)
    }

    fn null(&mut self) -> IrValue {
        self.builder.ins().iconst(types::I64, NULL_HANDLE)
    }

    fn helper(&mut self, helper: Helper, args: &[IrValue], fallible: bool) -> Result<IrValue, CompileError> {
        let mut operands = Vec::with_capacity(args.len() + 1);
        operands.push(self.frame);
        operands.extend_from_slice(args);

        let call = self.builder.ins().call(self.helpers[helper as usize], &operands);
        let result = self
            .builder
            .inst_results(call)
            .first()
            .copied()
            .ok_or(CompileError::MissingReturnValue(helper.name()))?;

        if fallible {
            self.guard(result);
        }
        Ok(result)
    }

    /// Branches to the abort block when `handle` is [`FAILED`].
    fn guard(&mut self, handle: IrValue) {
        let failed = self.builder.ins().icmp_imm(IntCC::Equal, handle, FAILED);
        let next = self.builder.create_block();
        self.builder.ins().brif(failed, self.abort, &[], next, &[]);
        self.builder.switch_to_block(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingHost;
    use crate::parser::parse_source;

    fn compile(source: &str) -> Result<NativeFunction, CompileError> {
        let program = parse_source(source).unwrap();
        let generator = CodeGenerator::new(Arc::new(ModuleRegistry::standard()));
        generator.compile_statement(&Statement::Block(program.statements))
    }

    #[test]
    fn test_arithmetic() {
        let host = RecordingHost::new();
        let function = compile("2 + 3 * 4").unwrap();
        assert_eq!(function.invoke(&host).unwrap(), Value::Integer(14));
        // Invocations are independent.
        assert_eq!(function.invoke(&host).unwrap(), Value::Integer(14));
    }

    #[test]
    fn test_unknown_names_fail_at_compile_time() {
        assert!(matches!(
            compile("nothing_here"),
            Err(CompileError::Resolution(RuntimeError::UnknownIdentifier(_)))
        ));
        assert!(matches!(
            compile("txt.upper \"a\""),
            Err(CompileError::Resolution(RuntimeError::UnknownModule(_)))
        ));
        assert!(matches!(
            compile("fn f() { 1 }"),
            Err(CompileError::Unsupported(_))
        ));
    }

    #[test]
    fn test_constant_pool() {
        let function = compile("send \"a\"\nsend \"a\" + 1").unwrap();
        // One entry per literal occurrence.
        assert_eq!(function.constant_count(), 3);
    }

    #[test]
    fn test_let_names_resolve_when_read() {
        let host = RecordingHost::new();

        // Read before the assignment that binds it on a later iteration.
        let function = compile("let i = 0\nlet r = 0\nwhile i < 2 {\n  if i == 1 { let r = y }\n  let y = 7\n  let i = i + 1\n}\nr").unwrap();
        assert_eq!(function.invoke(&host), Ok(Value::Integer(7)));

        // Assigned only on a branch that never runs.
        let function = compile("if 0 { let x = 1 }\nx").unwrap();
        assert_eq!(function.invoke(&host), Err(RuntimeError::UnknownIdentifier("x".into())));
    }
}
