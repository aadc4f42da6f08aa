//! Documentation content for the hotkey CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Hotkeys,
    Pipelines,
    Modules,
    Operators,
    Types,
    Modes,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" | "statements" => Some(Self::Syntax),
            "hotkeys" | "hotkey" | "keys" => Some(Self::Hotkeys),
            "pipelines" | "pipeline" | "pipes" => Some(Self::Pipelines),
            "modules" | "module" | "stdlib" | "functions" => Some(Self::Modules),
            "operators" | "ops" => Some(Self::Operators),
            "types" | "type" | "values" => Some(Self::Types),
            "modes" | "mode" | "jit" | "aot" => Some(Self::Modes),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"HOTKEY DOCUMENTATION

Hotkey scripts bind key combinations to actions. Actions are pipelines of
built-in operations on the clipboard, text, windows and keystrokes.

DOCUMENTATION CATEGORIES

  syntax            Statements: bindings, blocks, let, if, while, fn, return
  hotkeys           Writing key combinations and how they are normalized
  pipelines         Chaining stages with |
  modules           clipboard, text, window, system and send
  operators         Arithmetic, comparison and logical operators
  types             Values and conversions between them
  modes             Interpreter, JIT and ahead-of-time execution

QUICK REFERENCE

  F1 => send "Hello"                 Bind an action
  clipboard.out | text.upper | send  Pipeline
  text.replace " " "_"               Command call (arguments on the same line)
  window.focus("Editor")             Parenthesized call
  let name = value                   Variable

Run 'hotkey doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC),
        Some(DocCategory::Hotkeys) => Ok(HOTKEYS_DOC),
        Some(DocCategory::Pipelines) => Ok(PIPELINES_DOC),
        Some(DocCategory::Modules) => Ok(MODULES_DOC),
        Some(DocCategory::Operators) => Ok(OPERATORS_DOC),
        Some(DocCategory::Types) => Ok(TYPES_DOC),
        Some(DocCategory::Modes) => Ok(MODES_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r#"SYNTAX - Statements

Statements are separated by newlines or ';'. Comments start with //.

HOTKEY BINDING
  <hotkey> => <statement>
    Runs the statement each time the combination is pressed.

    Example:
      F1 => send "Hello World!"
      Ctrl+V => {
          let content = clipboard.out
          send content | text.sanitize
      }

BLOCK
  { statement; statement }
    Evaluates to its last statement's value.

LET
  let name = expression
    Creates or overwrites a variable. Evaluates to the bound value.

IF / ELSE
  if condition { ... } else if other { ... } else { ... }
    'else' may start on the line after the closing brace.

WHILE
  while condition { ... }

FUNCTIONS
  fn name(a, b) { return a + b }
    Functions run in a copy of the caller's variables. Recursion depth is
    limited. Functions are only available in interpreter mode.

CALLS
  module.function(a, b)       Parenthesized arguments
  module.function a b         Command form: arguments on the same line
  send "DEBUG: " + content    Command arguments may contain operators
"#;

const HOTKEYS_DOC: &str = r#"HOTKEYS - Key Combinations

WORD MODIFIERS
  Ctrl+A  Alt+Tab  Shift+F3  Win+1
    Modifier words are case-insensitive. 'Control' and 'Super' are accepted.

SYMBOLIC PREFIXES
  ^a      Ctrl+A
  !Tab    Alt+Tab
  +a      Shift+A (only at the start of a statement)
  #1      Win+1

SINGLE KEYS
  F1 .. F24, or any key name directly followed by =>:
    Escape => window.prev

NORMALIZATION
  Modifiers are sorted as Ctrl, Alt, Shift, Win and key names are
  capitalized, so these all name the same binding:
    Ctrl+Shift+A   shift+ctrl+a   ^+a

  Binding a combination again replaces the earlier action.
"#;

const PIPELINES_DOC: &str = r#"PIPELINES - Chaining Stages

  stage0 | stage1 | stage2

  The first stage is evaluated normally. Every later stage receives the
  previous result as its first argument:

    "hello world" | text.upper | text.replace " " "_"
    => "HELLO_WORLD"

STAGE FORMS
  text.upper              Called with the running value
  text.replace " " "_"    Running value prepended to the arguments
  window.next             Functions without parameters ignore the value

  A '|' at the start of the next line continues the pipeline.
  Any other expression as a stage is an error.
"#;

const MODULES_DOC: &str = r#"MODULES - Built-in Functions

CLIPBOARD
  clipboard.get / clipboard.out   () -> string
  clipboard.set                   (text) -> text

TEXT
  text.upper, text.lower, text.trim   (s) -> string
  text.sanitize                       (s) -> string without control
                                      characters, whitespace collapsed
  text.replace                        (s, search, replacement) -> string
  text.contains                       (s, needle) -> boolean

KEYS
  send                                (text) -> null

WINDOW
  window.focus                        (title) -> boolean (found)
  window.next, window.prev            () -> null
  window.list                         () -> list of titles

SYSTEM
  system.sleep                        (milliseconds) -> null
  system.log                          (message) -> null
"#;

const OPERATORS_DOC: &str = r#"OPERATORS - Arithmetic, Comparison and Logic

PRECEDENCE (lowest first)
  |                 Pipeline
  or  ||
  and &&
  == != < <= > >=
  + -
  * /
  -x                Unary minus

ARITHMETIC
  +   Concatenates when either side is a string, otherwise adds
  - * /
      Integer results stay integers; inexact division gives a float.
      Division by zero is an error.

COMPARISON
  == and != compare strings (and lists) exactly, anything else by number.
  Ordering operators always compare numbers.

LOGIC
  and / or short-circuit and return a boolean.
"#;

const TYPES_DOC: &str = r#"TYPES - Values and Conversions

  null, boolean, integer, float, string, list (of strings)

TRUTHINESS
  false: null, false, 0, "", empty list
  true:  everything else

AS NUMBER
  strings are parsed (surrounding spaces ignored), 0 if not a number
  true -> 1, false -> 0, null -> 0, lists -> 0

AS STRING
  null -> "null", booleans -> "true"/"false", lists -> "[a, b]"
"#;

const MODES_DOC: &str = r#"MODES - Execution Strategies

INTERPRETER (default)
  Walks the syntax tree. Every statement runs; bindings capture the
  variables defined before them.

JIT
  Each binding's action is compiled to machine code when the script
  loads. Unknown names and wrong argument counts are reported at load
  time. Other top-level statements run once as compiled code.

AHEAD-OF-TIME
  hotkey compile script.hk script.hkb
    Compiles every binding to verify it, then writes a bundle. Running
    the bundle binds the verified actions natively.
"#;
