//! Diagnostic codes emitted by the codec.

use iceasc_diagnostics::{Category, DiagnosticCode};

/// A net with connections but no routing was left out of the output.
pub const UNROUTED_NET: DiagnosticCode = DiagnosticCode::new(Category::Warning, 101);
/// A `.net` annotation whose wires belong to no reconstructed net.
pub const STALE_ANNOTATION: DiagnosticCode = DiagnosticCode::new(Category::Warning, 102);
/// A `.net` annotation whose name is already taken.
pub const ANNOTATION_CONFLICT: DiagnosticCode = DiagnosticCode::new(Category::Warning, 103);
/// A second cell output found on a reconstructed net.
pub const EXTRA_DRIVER: DiagnosticCode = DiagnosticCode::new(Category::Netlist, 201);
/// The text targets a device other than the context's.
pub const TARGET_MISMATCH: DiagnosticCode = DiagnosticCode::new(Category::Silicon, 401);
