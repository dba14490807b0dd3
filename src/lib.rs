//! # loom-ui
//!
//! A term-driven, declarative dialog compiler and bidirectional property
//! bridge.
//!
//! loom-ui takes a loosely-typed symbolic expression tree (a "term": a named
//! node with ordered, heterogeneously typed arguments) and compiles it into
//! a strongly-typed widget tree; selection widgets, trees, tables and menus
//! additionally carry item hierarchies that parse from and serialize back to
//! terms without losing round-trip fidelity. Once a dialog is live, named
//! get/set property requests are routed to the correct widget-kind handler
//! by ordered capability probing.
//!
//! ## Core Systems
//!
//! - **[`term`]** — Term value model, canonical rendering, logos-based
//!   tokenizer and recursive-descent text parser
//! - **[`widget`]** — Closed widget-kind sum type, slotmap-backed tree
//!   arena, dialog-scoped identifier registry
//! - **[`compile`]** — The term → widget-tree compiler: id/opt extraction,
//!   fixed kind dispatch, per-kind argument validation
//! - **[`item`]** — Item model and the parsers/serializers for selection,
//!   tree, menu and table item lists
//! - **[`property`]** — The property bridge: ordered-candidate get/set
//!   dispatch with term-keyed table cell access
//! - **[`dialog`]** — `Dialog`: compilation entry point and property access
//!   by widget identifier
//!
//! ## Example
//!
//! ```
//! use loom_ui::{Dialog, Value};
//!
//! let mut dialog = Dialog::from_text(
//!     r#"VBox(
//!         SelectionBox(id(menu), "Pick one:", ["Tomato", item(id(c), "Cucumber")]),
//!         PushButton(id(ok), "OK")
//!     )"#,
//! )
//! .unwrap();
//!
//! dialog.change_widget(&Value::sym("menu"), "Value", &Value::sym("c")).unwrap();
//! assert_eq!(
//!     dialog.query_widget(&Value::sym("menu"), "Value").unwrap(),
//!     Value::sym("c"),
//! );
//! ```

pub mod compile;
pub mod dialog;
pub mod error;
pub mod item;
pub mod property;
pub mod term;
pub mod widget;

pub use dialog::Dialog;
pub use error::{CompileError, PropertyError};
pub use term::{parse_term, parse_value, Term, Value};
pub use widget::{WidgetId, WidgetKind, WidgetNode};
