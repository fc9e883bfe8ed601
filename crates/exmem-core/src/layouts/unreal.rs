use crate::codec::ValueType;
use crate::layouts::remote_struct;
use crate::schema::{DeclaredLayout, FieldSpec, LayoutSpec};
use crate::structure::StructDescriptor;

pub const T_WEAK_OBJECT_PTR: &str = "TWeakObjectPtr";
pub const T_ENUM_AS_BYTE: &str = "TEnumAsByte";

/// Object index and serial number of a weak object reference
pub(crate) fn weak_object_ptr() -> LayoutSpec {
    LayoutSpec::new(T_WEAK_OBJECT_PTR)
        .field(FieldSpec::scalar("object_index", 0, ValueType::I32))
        .field(FieldSpec::scalar("object_serial_number", 4, ValueType::I32))
}

/// Enum stored in a single byte
pub(crate) fn enum_as_byte() -> LayoutSpec {
    LayoutSpec::new(T_ENUM_AS_BYTE).field(FieldSpec::scalar("value", 0, ValueType::U8))
}

/// Name table index plus instance number
#[derive(Debug)]
pub struct FName(StructDescriptor);

remote_struct!(FName);

impl DeclaredLayout for FName {
    const NAME: &'static str = "FName";

    fn layout_spec() -> LayoutSpec {
        LayoutSpec::new(Self::NAME)
            .field(FieldSpec::scalar("index", 0, ValueType::I32))
            .field(FieldSpec::scalar("number", 4, ValueType::I32))
    }
}

impl FName {
    pub fn index(&self) -> i32 {
        self.0.get("index").unwrap_or(0)
    }

    pub fn number(&self) -> i32 {
        self.0.get("number").unwrap_or(0)
    }
}

/// Rotation quaternion, translation and scale
#[derive(Debug)]
pub struct FTransform(StructDescriptor);

remote_struct!(FTransform);

impl DeclaredLayout for FTransform {
    const NAME: &'static str = "FTransform";

    fn layout_spec() -> LayoutSpec {
        let mut spec = LayoutSpec::new(Self::NAME);
        let groups = [
            ("rotation", 0x00, &["x", "y", "z", "w"][..]),
            ("translation", 0x10, &["x", "y", "z"][..]),
            ("scale", 0x1C, &["x", "y", "z"][..]),
        ];
        for (group, base, axes) in groups {
            for (i, axis) in axes.iter().enumerate() {
                spec = spec.field(FieldSpec::scalar(
                    &format!("{}_{}", group, axis),
                    base + i * 4,
                    ValueType::F32,
                ));
            }
        }
        spec
    }
}

impl FTransform {
    fn component(&self, name: &str) -> f32 {
        self.0.get(name).unwrap_or(0.0)
    }

    /// Quaternion as `[x, y, z, w]`
    pub fn rotation(&self) -> [f32; 4] {
        ["rotation_x", "rotation_y", "rotation_z", "rotation_w"].map(|n| self.component(n))
    }

    pub fn translation(&self) -> [f32; 3] {
        ["translation_x", "translation_y", "translation_z"].map(|n| self.component(n))
    }

    pub fn scale(&self) -> [f32; 3] {
        ["scale_x", "scale_y", "scale_z"].map(|n| self.component(n))
    }

    /// Row-major 4x4 matrix, translation in the last row
    pub fn to_matrix_with_scale(&self) -> [[f32; 4]; 4] {
        let [x, y, z, w] = self.rotation();
        let [tx, ty, tz] = self.translation();
        let [sx, sy, sz] = self.scale();

        let (x2, y2, z2) = (x + x, y + y, z + z);
        let (xx2, yy2, zz2) = (x * x2, y * y2, z * z2);
        let (yz2, wx2) = (y * z2, w * x2);
        let (xy2, wz2) = (x * y2, w * z2);
        let (xz2, wy2) = (x * z2, w * y2);

        [
            [(1.0 - (yy2 + zz2)) * sx, (xy2 + wz2) * sx, (xz2 - wy2) * sx, 0.0],
            [(xy2 - wz2) * sy, (1.0 - (xx2 + zz2)) * sy, (yz2 + wx2) * sy, 0.0],
            [(xz2 + wy2) * sz, (yz2 - wx2) * sz, (1.0 - (xx2 + yy2)) * sz, 0.0],
            [tx, ty, tz, 1.0],
        ]
    }
}
