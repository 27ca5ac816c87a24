use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }
        }
    };
}

id_newtype!(ItemId);
id_newtype!(PlayerId);
id_newtype!(InteractionId);

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemLayer {
    Map,
    Token,
    Note,
}

/// A scene object owned by the host. Only `rotation` is mutated from this
/// codebase; everything else is read as reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub layer: ItemLayer,
    pub position: Point,
    /// Rotation in degrees. Unbounded: values outside [0, 360) are
    /// meaningful to the renderer and must not be wrapped.
    pub rotation: f64,
    pub visible: bool,
}

impl Item {
    pub fn token(name: impl Into<String>, position: Point) -> Self {
        Self {
            id: ItemId::generate(),
            name: name.into(),
            layer: ItemLayer::Token,
            position,
            rotation: 0.0,
            visible: true,
        }
    }
}
