//! Core DICOM concepts shared across the voxelmesh crates: data element
//! tags, a dictionary of the tags the pipeline reads, value representations,
//! tagged element values with lenient decoders, an element map, and the
//! supported transfer syntaxes.

pub mod data_element_tag;
pub mod dictionary;
pub mod element_map;
pub mod element_value;
pub mod error;
pub mod transfer_syntax;
pub mod value_representation;

pub use data_element_tag::DataElementTag;
pub use element_map::ElementMap;
pub use element_value::ElementValue;
pub use error::VoxelmeshError;
pub use transfer_syntax::TransferSyntax;
pub use value_representation::ValueRepresentation;
