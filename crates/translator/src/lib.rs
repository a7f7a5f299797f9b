pub mod context;
pub mod error;
pub mod mapping;
pub mod property_analysis;
pub mod registry;
pub mod sanitize;
pub mod strategies;
pub mod type_converter;
pub mod warning;

pub use context::{
    ConversionOutput, DecisionId, DecisionOption, PendingDecision, TranslationContext,
    TranslationStats,
};
pub use error::{ErrorKind, Result, TranslatorError};
pub use mapping::{Cardinality, GeneratedMapping, GeneratedMappingRule, MappingType};
pub use property_analysis::{
    analyze_properties, PropertyMappingStrategy, PropertyProfile, SampleDataSet,
    CORE_FREQUENCY_THRESHOLD,
};
pub use registry::{Strategy, StrategyRegistry};
pub use sanitize::{sanitize, Sanitizer};
pub use strategies::{GraphToRelational, NullStrategy, RelationalToGraph};
pub use type_converter::{CanonicalType, ConvertedType, StandardTypeConverter, TypeConverter, UnknownTypeError};
pub use warning::{Severity, TranslationWarning, WarningKind};
