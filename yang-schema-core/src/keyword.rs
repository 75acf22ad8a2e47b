//! Keyword recognition (§4.A): a total function from `(text, prefix_length)`
//! to at most one keyword tag. A prefixed identifier is always a vendor
//! extension; an unprefixed one is matched exactly against the closed set
//! of YANG statement keywords.
//!
//! The dispatch is a switch on the first byte with nested string
//! comparisons in each arm — "the idiomatic C shape" per Design Notes §9 —
//! rather than a generated perfect-hash table, since branch-predictor
//! friendliness matters more here than code size for a ~70-entry table.

/// One recognized YANG statement keyword, or a vendor (`prefix:name`)
/// extension statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Module,
    Submodule,
    Import,
    Include,
    BelongsTo,
    Prefix,
    Namespace,
    Revision,
    RevisionDate,
    Typedef,
    Type,
    Grouping,
    Uses,
    Container,
    Leaf,
    LeafList,
    List,
    Choice,
    Case,
    Anyxml,
    Anydata,
    Augment,
    Deviation,
    Deviate,
    Rpc,
    Action,
    Notification,
    Input,
    Output,
    Feature,
    IfFeature,
    Identity,
    Base,
    Extension,
    Argument,
    YinElement,
    Status,
    Description,
    Reference,
    Organization,
    Contact,
    Default,
    Config,
    Mandatory,
    MinElements,
    MaxElements,
    OrderedBy,
    Key,
    Unique,
    Presence,
    When,
    Must,
    ErrorAppTag,
    ErrorMessage,
    Path,
    Pattern,
    Length,
    Range,
    Enum,
    Bit,
    Value,
    Position,
    FractionDigits,
    RequireInstance,
    Modifier,
    Units,
    Refine,
    YangVersion,
    /// Any prefixed keyword: a vendor extension statement (§4.A).
    CustomExtension,
}

/// Recognize a keyword given its text and the length of its prefix (0 if
/// unprefixed). Exact match only: a supplied length longer or shorter than
/// the matched token's own length yields `None`, never a partial match.
pub fn recognize(text: &str, prefix_length: usize) -> Option<Keyword> {
    if prefix_length > 0 {
        return Some(Keyword::CustomExtension);
    }

    let first = text.as_bytes().first().copied()?;
    match first {
        b'a' => match text {
            "action" => Some(Keyword::Action),
            "anydata" => Some(Keyword::Anydata),
            "anyxml" => Some(Keyword::Anyxml),
            "argument" => Some(Keyword::Argument),
            "augment" => Some(Keyword::Augment),
            _ => None,
        },
        b'b' => match text {
            "base" => Some(Keyword::Base),
            "belongs-to" => Some(Keyword::BelongsTo),
            "bit" => Some(Keyword::Bit),
            _ => None,
        },
        b'c' => match text {
            "case" => Some(Keyword::Case),
            "choice" => Some(Keyword::Choice),
            "config" => Some(Keyword::Config),
            "contact" => Some(Keyword::Contact),
            "container" => Some(Keyword::Container),
            _ => None,
        },
        b'd' => match text {
            "default" => Some(Keyword::Default),
            "description" => Some(Keyword::Description),
            "deviate" => Some(Keyword::Deviate),
            "deviation" => Some(Keyword::Deviation),
            _ => None,
        },
        b'e' => match text {
            "enum" => Some(Keyword::Enum),
            "error-app-tag" => Some(Keyword::ErrorAppTag),
            "error-message" => Some(Keyword::ErrorMessage),
            "extension" => Some(Keyword::Extension),
            _ => None,
        },
        b'f' => match text {
            "feature" => Some(Keyword::Feature),
            "fraction-digits" => Some(Keyword::FractionDigits),
            _ => None,
        },
        b'g' => match text {
            "grouping" => Some(Keyword::Grouping),
            _ => None,
        },
        b'i' => match text {
            "identity" => Some(Keyword::Identity),
            "if-feature" => Some(Keyword::IfFeature),
            "import" => Some(Keyword::Import),
            "include" => Some(Keyword::Include),
            "input" => Some(Keyword::Input),
            _ => None,
        },
        b'k' => match text {
            "key" => Some(Keyword::Key),
            _ => None,
        },
        b'l' => match text {
            "leaf" => Some(Keyword::Leaf),
            "leaf-list" => Some(Keyword::LeafList),
            "length" => Some(Keyword::Length),
            "list" => Some(Keyword::List),
            _ => None,
        },
        b'm' => match text {
            "mandatory" => Some(Keyword::Mandatory),
            "max-elements" => Some(Keyword::MaxElements),
            "min-elements" => Some(Keyword::MinElements),
            "modifier" => Some(Keyword::Modifier),
            "module" => Some(Keyword::Module),
            "must" => Some(Keyword::Must),
            _ => None,
        },
        b'n' => match text {
            "namespace" => Some(Keyword::Namespace),
            "notification" => Some(Keyword::Notification),
            _ => None,
        },
        b'o' => match text {
            "ordered-by" => Some(Keyword::OrderedBy),
            "organization" => Some(Keyword::Organization),
            "output" => Some(Keyword::Output),
            _ => None,
        },
        b'p' => match text {
            "path" => Some(Keyword::Path),
            "pattern" => Some(Keyword::Pattern),
            "position" => Some(Keyword::Position),
            "prefix" => Some(Keyword::Prefix),
            "presence" => Some(Keyword::Presence),
            _ => None,
        },
        b'r' => match text {
            "range" => Some(Keyword::Range),
            "reference" => Some(Keyword::Reference),
            "refine" => Some(Keyword::Refine),
            "require-instance" => Some(Keyword::RequireInstance),
            "revision" => Some(Keyword::Revision),
            "revision-date" => Some(Keyword::RevisionDate),
            "rpc" => Some(Keyword::Rpc),
            _ => None,
        },
        b's' => match text {
            "status" => Some(Keyword::Status),
            "submodule" => Some(Keyword::Submodule),
            _ => None,
        },
        b't' => match text {
            "type" => Some(Keyword::Type),
            "typedef" => Some(Keyword::Typedef),
            _ => None,
        },
        b'u' => match text {
            "unique" => Some(Keyword::Unique),
            "units" => Some(Keyword::Units),
            "uses" => Some(Keyword::Uses),
            _ => None,
        },
        b'v' => match text {
            "value" => Some(Keyword::Value),
            _ => None,
        },
        b'w' => match text {
            "when" => Some(Keyword::When),
            _ => None,
        },
        b'y' => match text {
            "yang-version" => Some(Keyword::YangVersion),
            "yin-element" => Some(Keyword::YinElement),
            _ => None,
        },
        _ => None,
    }
}
