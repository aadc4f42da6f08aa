use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use crate::{ast::FunctionDecl, error::RuntimeError, host::Host, stdlib, value::Value};

/// Signature shared by every built-in function.
pub type NativeFn = fn(&dyn Host, &[Value]) -> Result<Value, RuntimeError>;

/// Namespace of functions callable without a module prefix (`send`).
pub const GLOBAL_MODULE: &str = "global";

/// A fixed-arity built-in function.
#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    /// Index in the owning registry; stable for the registry's lifetime.
    pub id: usize,
    pub module: &'static str,
    pub name: &'static str,
    pub arity: usize,
    pub func: NativeFn,
}

impl Builtin {
    /// `module.name`, or just `name` for globals.
    pub fn qualified_name(&self) -> String {
        if self.module == GLOBAL_MODULE {
            self.name.to_string()
        } else {
            format!("{}.{}", self.module, self.name)
        }
    }

    /// Invokes the function after checking the argument count.
    pub fn call(&self, host: &dyn Host, args: &[Value]) -> Result<Value, RuntimeError> {
        if args.len() != self.arity {
            return Err(RuntimeError::ArityMismatch {
                function: self.qualified_name(),
                expected: self.arity,
                found: args.len(),
            });
        }
        (self.func)(host, args)
    }
}

/// A named group of built-ins (`text`, `clipboard`, ...).
#[derive(Debug, Clone, Default)]
pub struct Module {
    pub name: &'static str,
    functions: BTreeMap<&'static str, usize>,
}

impl Module {
    /// Function names in alphabetical order.
    pub fn function_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.functions.keys().copied()
    }
}

/// The read-only symbol table of built-in modules.
///
/// Built once at startup and shared by the interpreter and the code
/// generator through an `Arc`; nothing mutates it afterwards.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    builtins: Vec<Builtin>,
    modules: BTreeMap<&'static str, Module>,
}

impl ModuleRegistry {
    /// An empty registry with no modules.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard library: `clipboard`, `text`, `window`, `system` and the
    /// global `send`.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        stdlib::install(&mut registry);
        registry
    }

    /// Adds (or replaces) `module.name` and returns its id.
    pub fn register(
        &mut self,
        module: &'static str,
        name: &'static str,
        arity: usize,
        func: NativeFn,
    ) -> usize {
        let id = self.builtins.len();
        self.builtins.push(Builtin {
            id,
            module,
            name,
            arity,
            func,
        });
        let entry = self.modules.entry(module).or_insert_with(|| Module {
            name: module,
            functions: BTreeMap::new(),
        });
        entry.functions.insert(name, id);
        id
    }

    pub fn register_global(&mut self, name: &'static str, arity: usize, func: NativeFn) -> usize {
        self.register(GLOBAL_MODULE, name, arity, func)
    }

    pub fn has_module(&self, name: &str) -> bool {
        name != GLOBAL_MODULE && self.modules.contains_key(name)
    }

    /// Resolves `module.function`.
    pub fn lookup(&self, module: &str, function: &str) -> Result<&Builtin, RuntimeError> {
        if !self.has_module(module) {
            return Err(RuntimeError::UnknownModule(module.to_string()));
        }
        self.modules
            .get(module)
            .and_then(|m| m.functions.get(function))
            .and_then(|id| self.builtins.get(*id))
            .ok_or_else(|| RuntimeError::UnknownFunction {
                module: module.to_string(),
                function: function.to_string(),
            })
    }

    /// Resolves a function callable without a module prefix.
    pub fn lookup_global(&self, name: &str) -> Option<&Builtin> {
        self.modules
            .get(GLOBAL_MODULE)
            .and_then(|m| m.functions.get(name))
            .and_then(|id| self.builtins.get(*id))
    }

    pub fn get(&self, id: usize) -> Option<&Builtin> {
        self.builtins.get(id)
    }

    /// Named modules, excluding the global namespace.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules
            .values()
            .filter(|m| m.name != GLOBAL_MODULE)
    }

    pub fn globals(&self) -> impl Iterator<Item = &Builtin> {
        self.modules
            .get(GLOBAL_MODULE)
            .into_iter()
            .flat_map(|m| m.functions.values())
            .filter_map(|id| self.builtins.get(*id))
    }
}

/// Variables, user functions and the shared module registry visible to a
/// running script.
///
/// The environment is flat: `let` overwrites any existing variable of the
/// same name. Cloning is how a binding snapshots its scope.
#[derive(Debug, Clone)]
pub struct Environment {
    variables: HashMap<String, Value>,
    functions: HashMap<String, Arc<FunctionDecl>>,
    modules: Arc<ModuleRegistry>,
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new(Arc::new(ModuleRegistry::standard()))
    }
}

impl Environment {
    pub fn new(modules: Arc<ModuleRegistry>) -> Self {
        Environment {
            variables: HashMap::new(),
            functions: HashMap::new(),
            modules,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    pub fn define_function(&mut self, decl: FunctionDecl) {
        self.functions.insert(decl.name.clone(), Arc::new(decl));
    }

    pub fn function(&self, name: &str) -> Option<Arc<FunctionDecl>> {
        self.functions.get(name).cloned()
    }

    pub fn modules(&self) -> &Arc<ModuleRegistry> {
        &self.modules
    }

    /// Variable names, unordered.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_errors() {
        let registry = ModuleRegistry::standard();
        assert!(registry.lookup("text", "upper").is_ok());
        assert_eq!(
            registry.lookup("txt", "upper").unwrap_err(),
            RuntimeError::UnknownModule("txt".into())
        );
        assert_eq!(
            registry.lookup("text", "shout").unwrap_err(),
            RuntimeError::UnknownFunction {
                module: "text".into(),
                function: "shout".into()
            }
        );
        assert!(registry.lookup(GLOBAL_MODULE, "send").is_err());
        assert_eq!(registry.lookup_global("send").map(|b| b.arity), Some(1));
    }

    #[test]
    fn test_ids_are_stable() {
        let registry = ModuleRegistry::standard();
        let builtin = registry.lookup("clipboard", "out").unwrap();
        assert_eq!(registry.get(builtin.id).map(|b| b.name), Some("out"));
    }

    #[test]
    fn test_let_overwrites() {
        let mut env = Environment::default();
        env.set("x", Value::Integer(1));
        env.set("x", Value::from("two"));
        assert_eq!(env.get("x"), Some(&Value::from("two")));
        assert_eq!(env.variable_names().collect::<Vec<_>>(), vec!["x"]);
    }

    #[test]
    fn test_standard_modules() {
        let registry = ModuleRegistry::standard();
        let text = registry.modules().find(|m| m.name == "text").unwrap();
        assert_eq!(
            text.function_names().collect::<Vec<_>>(),
            vec!["contains", "lower", "replace", "sanitize", "trim", "upper"]
        );
        let clipboard = registry.modules().find(|m| m.name == "clipboard").unwrap();
        assert_eq!(clipboard.function_names().collect::<Vec<_>>(), vec!["get", "out", "set"]);
    }
}
