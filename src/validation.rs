//! Structured rename-validation messages and the context that collects them.
//!
//! Validation problems are not `Err` values: they accumulate on a
//! [`ValidationContext`] so a caller can present all of them at once and
//! decide whether to proceed past warnings.

use std::fmt;

/// Reserved words that are legal identifier shapes but illegal names.
const RESERVED_WORDS: [&str; 54] = [
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "package", "private", "protected", "public", "return", "short", "static",
    "strictfp", "super", "switch", "synchronized", "this", "throw", "throws", "transient", "true",
    "false", "null", "try", "void", "volatile", "while", "var",
];

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Severity {
    /// Blocks the commit.
    Error,
    /// Reported; the commit proceeds if the notifier confirms it.
    Warning,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Message {
    NonUniqueName,
    NonUniqueNameClass,
    ShadowedName,
    ShadowedNameClass,
    IllegalIdentifier,
    IllegalClassName,
    ReservedWord,
    PackageSplit,
}

impl Message {
    pub fn severity(&self) -> Severity {
        match self {
            Message::NonUniqueName
            | Message::NonUniqueNameClass
            | Message::IllegalIdentifier
            | Message::IllegalClassName
            | Message::ReservedWord
            | Message::PackageSplit => Severity::Error,
            Message::ShadowedName | Message::ShadowedNameClass => Severity::Warning,
        }
    }
}

/// A message plus its display arguments (the offending name, and where the
/// collision sits when known).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ParameterizedMessage {
    pub message: Message,
    pub args: Vec<String>,
}

impl fmt::Display for ParameterizedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message {
            Message::NonUniqueName => write!(f, "name '{}' is not unique", self.arg(0)),
            Message::NonUniqueNameClass => write!(
                f,
                "name '{}' is not unique in {}",
                self.arg(0),
                self.arg(1)
            ),
            Message::ShadowedName => write!(f, "name '{}' shadows another member", self.arg(0)),
            Message::ShadowedNameClass => write!(
                f,
                "name '{}' shadows a member of {}",
                self.arg(0),
                self.arg(1)
            ),
            Message::IllegalIdentifier => write!(f, "'{}' is not a valid identifier", self.arg(0)),
            Message::IllegalClassName => write!(f, "'{}' is not a valid class name", self.arg(0)),
            Message::ReservedWord => write!(f, "'{}' is a reserved word", self.arg(0)),
            Message::PackageSplit => write!(
                f,
                "package-private coupled classes are mapped to different packages: {}",
                self.args.join(", ")
            ),
        }
    }
}

impl ParameterizedMessage {
    fn arg(&self, index: usize) -> &str {
        self.args.get(index).map(String::as_str).unwrap_or("?")
    }
}

/// Receives messages as they are raised and answers whether a warning-level
/// message should block the commit.
pub trait ValidationNotifier {
    fn notify(&self, message: &ParameterizedMessage);

    /// Return `true` to proceed despite the given warning.
    fn confirm_warning(&self, message: &ParameterizedMessage) -> bool;
}

/// Notifier that swallows messages and accepts every warning. Used by tests
/// and batch tooling that inspects the context afterwards.
pub struct SilentNotifier;

impl ValidationNotifier for SilentNotifier {
    fn notify(&self, _message: &ParameterizedMessage) {}

    fn confirm_warning(&self, _message: &ParameterizedMessage) -> bool {
        true
    }
}

/// Accumulates validation messages for one operation.
pub struct ValidationContext<'a> {
    notifier: &'a dyn ValidationNotifier,
    messages: Vec<ParameterizedMessage>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(notifier: &'a dyn ValidationNotifier) -> Self {
        ValidationContext {
            notifier,
            messages: Vec::new(),
        }
    }

    pub fn raise(&mut self, message: Message, args: &[&str]) {
        let message = ParameterizedMessage {
            message,
            args: args.iter().map(|s| s.to_string()).collect(),
        };
        self.notifier.notify(&message);
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ParameterizedMessage] {
        &self.messages
    }

    /// Whether the operation that raised these messages may commit: no
    /// errors, and every warning confirmed by the notifier.
    pub fn can_proceed(&self) -> bool {
        self.messages.iter().all(|m| match m.message.severity() {
            Severity::Error => false,
            Severity::Warning => self.notifier.confirm_warning(m),
        })
    }
}

// ---------------------------------------------------------------------------
// Identifier syntax
// ---------------------------------------------------------------------------

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_identifier_start(first) => chars.all(is_identifier_part),
        _ => false,
    }
}

/// Validate a member (field/method/variable) name.
pub fn validate_identifier(vc: &mut ValidationContext<'_>, name: &str) {
    if !is_identifier(name) {
        vc.raise(Message::IllegalIdentifier, &[name]);
    } else if RESERVED_WORDS.contains(&name) {
        vc.raise(Message::ReservedWord, &[name]);
    }
}

/// Validate a class name. Top-level classes may be qualified with a package
/// path (`com/example/Foo`); inner class names are single identifiers.
pub fn validate_class_name(vc: &mut ValidationContext<'_>, name: &str, inner: bool) {
    if inner {
        if name.contains('/') || name.contains('$') {
            vc.raise(Message::IllegalClassName, &[name]);
            return;
        }

        validate_identifier(vc, name);
        return;
    }

    if name.is_empty() || name.starts_with('/') || name.ends_with('/') {
        vc.raise(Message::IllegalClassName, &[name]);
        return;
    }

    for segment in name.split('/') {
        if !is_identifier(segment) {
            vc.raise(Message::IllegalClassName, &[name]);
            return;
        }
    }

    if RESERVED_WORDS.contains(&name.rsplit('/').next().unwrap_or(name)) {
        vc.raise(Message::ReservedWord, &[name]);
    }
}
