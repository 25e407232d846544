//! Block reference extraction from ASCII drawing-exchange (DXF) documents.

pub mod document;
pub mod error;
pub mod extract;

pub use document::{Document, Entity, GroupPair, Section, Value};
pub use error::{ExtractError, ParseError};
pub use extract::{BlockCandidate, Coordinates, extract};
