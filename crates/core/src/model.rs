//! The baked-model capability interface and its request inputs.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use glam::Mat4;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Direction, Directions, QuadList, Sprite, VertexFormatError};

/// Engine block state a model is queried for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockState {
    /// Block identifier.
    pub id: u16,
    /// Packed state bits.
    pub state: u16,
}

impl BlockState {
    /// Construct a block state.
    pub const fn new(id: u16, state: u16) -> Self {
        Self { id, state }
    }
}

/// Marker for values that can be stored in a [`ModelData`] bag.
pub trait ModelProperty: Any + Send + Sync {}

/// Per-block auxiliary render data, looked up by property type.
#[derive(Default)]
pub struct ModelData {
    properties: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl ModelData {
    /// A bag with no properties.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builder-style [`ModelData::insert`].
    pub fn with<P: ModelProperty>(mut self, property: P) -> Self {
        self.insert(property);
        self
    }

    /// Store `property`, replacing any previous value of the same type.
    pub fn insert<P: ModelProperty>(&mut self, property: P) {
        self.properties.insert(TypeId::of::<P>(), Box::new(property));
    }

    /// Look up a property by type.
    pub fn get<P: ModelProperty>(&self) -> Option<&P> {
        self.properties
            .get(&TypeId::of::<P>())
            .and_then(|value| value.downcast_ref::<P>())
    }

    /// Signature of the connectivity payload, or [`ConnectivitySignature::NONE`].
    pub fn connectivity_signature(&self) -> ConnectivitySignature {
        self.get::<ConnectivityData>()
            .map_or(ConnectivitySignature::NONE, ConnectivityData::signature)
    }
}

impl fmt::Debug for ModelData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelData")
            .field("properties", &self.properties.len())
            .field("connectivity", &self.get::<ConnectivityData>())
            .finish()
    }
}

/// Opaque token identifying a neighbour-connectivity pattern.
///
/// Equal signatures mean equal remapped geometry for a given model.
/// [`ConnectivitySignature::NONE`] stands for "no connectivity data".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ConnectivitySignature(u64);

impl ConnectivitySignature {
    /// No connectivity data available.
    pub const NONE: Self = Self(0);

    /// Wrap an externally computed token.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw token value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Connectivity payload computed upstream for one block position.
///
/// The bits are produced by the connection logic and are opaque here; only
/// their content hash matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ConnectivityData {
    connections: u64,
}

impl ConnectivityData {
    /// Wrap raw connection bits.
    pub const fn new(connections: u64) -> Self {
        Self { connections }
    }

    /// Payload connecting across the given faces.
    pub fn from_faces(faces: Directions) -> Self {
        Self::new(u64::from(faces.bits()))
    }

    /// Content hash of the payload. Never [`ConnectivitySignature::NONE`].
    pub fn signature(&self) -> ConnectivitySignature {
        let hash = blake3::hash(&self.connections.to_le_bytes());
        let mut word = [0u8; 8];
        word.copy_from_slice(&hash.as_bytes()[..8]);
        // 0 is reserved for "no data".
        ConnectivitySignature(u64::from_le_bytes(word).max(1))
    }
}

impl ModelProperty for ConnectivityData {}

/// Item display contexts a model may adjust its transform for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraTransform {
    /// No display transform.
    None,
    /// Held in the left hand, third-person view.
    ThirdPersonLeftHand,
    /// Held in the right hand, third-person view.
    ThirdPersonRightHand,
    /// Held in the left hand, first-person view.
    FirstPersonLeftHand,
    /// Held in the right hand, first-person view.
    FirstPersonRightHand,
    /// Worn on the head.
    Head,
    /// Inventory slot.
    Gui,
    /// Dropped on the ground.
    Ground,
    /// Item frame.
    Fixed,
}

/// Errors surfaced by a model's quad query.
///
/// Both variants are fatal for the request: nothing is cached and the
/// caller must not render the asset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The quads' vertex format cannot be remapped.
    #[error("broken vertex format: {0}")]
    Format(#[from] VertexFormatError),
    /// A quad query that must produce a list produced none.
    #[error("quad query for side {side:?} produced no quad list")]
    MissingQuads {
        /// Side that was queried.
        side: Option<Direction>,
    },
}

/// Anything the renderer can ask for geometry.
///
/// Implemented by plain baked models and by decorators wrapping them.
pub trait BakedModel: Send + Sync {
    /// Quads for `side` (`None` for the directionless/item query).
    fn quads(
        &self,
        state: Option<&BlockState>,
        side: Option<Direction>,
        seed: u64,
        data: &ModelData,
    ) -> Result<QuadList, ModelError>;

    /// Sprite sampled by break/landing particles.
    fn particle_sprite(&self) -> &dyn Sprite;

    /// Display transform for `transform`, plus the model to keep rendering with.
    fn handle_perspective(
        self: Arc<Self>,
        transform: CameraTransform,
    ) -> (Arc<dyn BakedModel>, Mat4);
}
