//! The Supersonic execution core: columnar `Block`/`View` storage, the
//! `Allocator` interface evaluation arenas are built on, the single- and
//! multi-source projectors, and the bound expression tree.
//!
//! Schemas, the scalar type enum, the error taxonomy and the sort/distinct
//! configuration records live one layer down, in `supersonic-types` — this
//! crate only adds the engine logic that binds and evaluates against them.

pub mod allocator;
pub mod bitmap;
pub mod block;
pub mod expression;
pub mod projector;

pub use allocator::{Allocator, BoundedAllocator, Buffer, HeapAllocator};
pub use bitmap::{Bitmap, BitmapView};
pub use block::{Block, ScalarValue, View};
pub use expression::{BoundExpression, BoundExpressionTree, ExpressionSpec};
pub use projector::{
    BoundMultiSourceProjector, BoundSingleSourceProjector, MultiSourceProjectorSpec,
    SingleSourceProjectorSpec, SourceAttribute,
};
