//! Ready-made layouts for common remote types.
//!
//! `register_builtin` adds them all to a registry; the typed wrappers give
//! named accessors on top of the raw field values.

/// Implements `RemoteStruct` and `From<StructDescriptor>` for a newtype
/// around a descriptor
macro_rules! remote_struct {
    ($name:ident) => {
        impl $crate::structure::RemoteStruct for $name {
            fn descriptor(&self) -> &$crate::structure::StructDescriptor {
                &self.0
            }

            fn descriptor_mut(&mut self) -> &mut $crate::structure::StructDescriptor {
                &mut self.0
            }
        }

        impl From<$crate::structure::StructDescriptor> for $name {
            fn from(desc: $crate::structure::StructDescriptor) -> Self {
                Self(desc)
            }
        }
    };
}

pub(crate) use remote_struct;

mod string;
mod unreal;

pub use string::{FString, PString};
pub use unreal::{FName, FTransform, T_ENUM_AS_BYTE, T_WEAK_OBJECT_PTR};

use crate::error::Result;
use crate::schema::{DeclaredLayout, SchemaRegistry};

/// Register every built-in layout
pub fn register_builtin(registry: &mut SchemaRegistry) -> Result<()> {
    registry.register_type::<PString>()?;
    registry.register_type::<FString>()?;
    registry.register_type::<FName>()?;
    registry.register_type::<FTransform>()?;
    registry.register(&unreal::weak_object_ptr())?;
    registry.register(&unreal::enum_as_byte())?;
    Ok(())
}

/// Names of the layouts added by [`register_builtin`]
pub fn builtin_names() -> [&'static str; 6] {
    [
        PString::NAME,
        FString::NAME,
        FName::NAME,
        FTransform::NAME,
        T_WEAK_OBJECT_PTR,
        T_ENUM_AS_BYTE,
    ]
}
