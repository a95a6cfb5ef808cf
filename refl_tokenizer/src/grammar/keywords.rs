//! Reserved names of the reflection header dialect
//!
//! Reflection markup macros, specifier macros and markers, and the symbol tables
//! used by the lexer and the declaration skipper.
use serde::{Deserialize, Serialize};

/// Reflection markup macros that attach metadata to the following declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReflectionMacro {
    UClass,
    UStruct,
    UEnum,
    UInterface,
    UProperty,
    UFunction,
    UDelegate,
}

impl ReflectionMacro {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UClass => "UCLASS",
            Self::UStruct => "USTRUCT",
            Self::UEnum => "UENUM",
            Self::UInterface => "UINTERFACE",
            Self::UProperty => "UPROPERTY",
            Self::UFunction => "UFUNCTION",
            Self::UDelegate => "UDELEGATE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "UCLASS" => Some(Self::UClass),
            "USTRUCT" => Some(Self::UStruct),
            "UENUM" => Some(Self::UEnum),
            "UINTERFACE" => Some(Self::UInterface),
            "UPROPERTY" => Some(Self::UProperty),
            "UFUNCTION" => Some(Self::UFunction),
            "UDELEGATE" => Some(Self::UDelegate),
            _ => None,
        }
    }

    /// Type-level macros start a reflected class, struct, enum or interface
    pub const fn is_type_macro(self) -> bool {
        matches!(
            self,
            Self::UClass | Self::UStruct | Self::UEnum | Self::UInterface
        )
    }
}

/// Deprecation macros taking `(version, "message")`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeprecationMacro {
    UeDeprecated,
    UeDeprecatedForGame,
    UeDeprecatedForEngine,
    Deprecated,
}

impl DeprecationMacro {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UeDeprecated => "UE_DEPRECATED",
            Self::UeDeprecatedForGame => "UE_DEPRECATED_FORGAME",
            Self::UeDeprecatedForEngine => "UE_DEPRECATED_FORENGINE",
            Self::Deprecated => "DEPRECATED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "UE_DEPRECATED" => Some(Self::UeDeprecated),
            "UE_DEPRECATED_FORGAME" => Some(Self::UeDeprecatedForGame),
            "UE_DEPRECATED_FORENGINE" => Some(Self::UeDeprecatedForEngine),
            "DEPRECATED" => Some(Self::Deprecated),
            _ => None,
        }
    }
}

/// Argument-less attribute markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecifierMarker {
    NoReturn,
    NoDiscard,
    NoDiscardCtor,
    NoUniqueAddress,
}

impl SpecifierMarker {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoReturn => "UE_NORETURN",
            Self::NoDiscard => "UE_NODISCARD",
            Self::NoDiscardCtor => "UE_NODISCARD_CTOR",
            Self::NoUniqueAddress => "UE_NO_UNIQUE_ADDRESS",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "UE_NORETURN" => Some(Self::NoReturn),
            "UE_NODISCARD" => Some(Self::NoDiscard),
            "UE_NODISCARD_CTOR" => Some(Self::NoDiscardCtor),
            "UE_NO_UNIQUE_ADDRESS" => Some(Self::NoUniqueAddress),
            _ => None,
        }
    }
}

// ============================================================================
// TABLES
// ============================================================================

/// Two-character symbols lexed greedily; `>>` is absent so nested template closers stay separate
pub fn two_char_symbols() -> &'static [&'static str] {
    &[
        "<<", "!=", "<=", ">=", "++", "--", "+=", "-=", "*=", "/=", "&&", "||", "^^", "==", "**",
        "~=", "::", "[[",
    ]
}

/// Prefixes of delegate and event declaration macros
pub fn delegate_macro_prefixes() -> &'static [&'static str] {
    &["DECLARE_MULTICAST_DELEGATE", "DECLARE_DELEGATE", "DECLARE_EVENT"]
}

/// Macro-style names the skipper treats as ordinary declarations
pub fn skipper_macro_exceptions() -> &'static [&'static str] {
    &["DECLARE_FUNCTION"]
}

/// Non-macro names whose argument list is delimited by parentheses
pub fn skipper_paren_identifiers() -> &'static [&'static str] {
    &["static_assert"]
}

pub fn is_reflection_macro(s: &str) -> bool {
    ReflectionMacro::from_str(s).is_some()
}

pub fn is_two_char_symbol(s: &str) -> bool {
    two_char_symbols().contains(&s)
}

/// Naming-convention test for macro invocations: `_` or `A-Z` first, then
/// only `A-Z`, digits and `_`; delegate/event macro prefixes always qualify.
pub fn probably_a_macro(identifier: &str) -> bool {
    if delegate_macro_prefixes()
        .iter()
        .any(|prefix| identifier.starts_with(prefix))
    {
        return true;
    }

    let mut chars = identifier.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_uppercase() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Word category used by the specifier parser and the skipper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordType {
    Reflection(ReflectionMacro),
    Deprecation(DeprecationMacro),
    Marker(SpecifierMarker),
    MacroStyle,
    Plain,
}

pub fn classify_word_type(word: &str) -> WordType {
    if let Some(reflection) = ReflectionMacro::from_str(word) {
        WordType::Reflection(reflection)
    } else if let Some(deprecation) = DeprecationMacro::from_str(word) {
        WordType::Deprecation(deprecation)
    } else if let Some(marker) = SpecifierMarker::from_str(word) {
        WordType::Marker(marker)
    } else if probably_a_macro(word) {
        WordType::MacroStyle
    } else {
        WordType::Plain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflection_macro_round_trip() {
        for name in [
            "UCLASS",
            "USTRUCT",
            "UENUM",
            "UINTERFACE",
            "UPROPERTY",
            "UFUNCTION",
            "UDELEGATE",
        ] {
            let parsed = ReflectionMacro::from_str(name).unwrap();
            assert_eq!(parsed.as_str(), name);
        }
        assert!(ReflectionMacro::UClass.is_type_macro());
        assert!(!ReflectionMacro::UProperty.is_type_macro());
        assert!(!is_reflection_macro("UObject"));
    }

    #[test]
    fn test_probably_a_macro() {
        assert!(probably_a_macro("MY_MACRO"));
        assert!(probably_a_macro("_INTERNAL2"));
        assert!(probably_a_macro("DECLARE_DELEGATE_OneParam"));
        assert!(!probably_a_macro("MyMacro"));
        assert!(!probably_a_macro("int"));
        assert!(!probably_a_macro(""));
    }

    #[test]
    fn test_two_char_symbols() {
        assert!(is_two_char_symbol("::"));
        assert!(is_two_char_symbol("[["));
        assert!(!is_two_char_symbol(">>"));
    }

    #[test]
    fn test_classify_word_type() {
        assert_eq!(
            classify_word_type("UPROPERTY"),
            WordType::Reflection(ReflectionMacro::UProperty)
        );
        assert_eq!(
            classify_word_type("UE_DEPRECATED"),
            WordType::Deprecation(DeprecationMacro::UeDeprecated)
        );
        assert_eq!(
            classify_word_type("UE_NODISCARD"),
            WordType::Marker(SpecifierMarker::NoDiscard)
        );
        assert_eq!(classify_word_type("GENERATED_BODY"), WordType::MacroStyle);
        assert_eq!(classify_word_type("float"), WordType::Plain);
    }
}
