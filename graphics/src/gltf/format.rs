//! Interchange-to-hardware format mapping.
//!
//! Pure translation from glTF enums (filters, wrap modes, accessor component
//! types) to device enums, plus raw attribute byte extraction. Nothing here
//! touches the device or does I/O.

use auriga_core::sampler::{AddressMode, FilterMode};
use gltf_dep::accessor::{DataType, Dimensions};
use gltf_dep::texture::{MagFilter, MinFilter, WrappingMode};

use crate::types::VertexFormat;

use super::error::GltfError;

/// Map a glTF minification filter. Mipmap variants collapse to their base
/// filter; an absent filter defaults to linear.
pub fn map_min_filter(filter: Option<MinFilter>) -> FilterMode {
    match filter {
        Some(MinFilter::Nearest)
        | Some(MinFilter::NearestMipmapNearest)
        | Some(MinFilter::NearestMipmapLinear) => FilterMode::Nearest,
        Some(MinFilter::Linear)
        | Some(MinFilter::LinearMipmapNearest)
        | Some(MinFilter::LinearMipmapLinear) => FilterMode::Linear,
        None => FilterMode::Linear,
    }
}

/// Map a glTF magnification filter. An absent filter defaults to linear.
pub fn map_mag_filter(filter: Option<MagFilter>) -> FilterMode {
    match filter {
        Some(MagFilter::Nearest) => FilterMode::Nearest,
        Some(MagFilter::Linear) | None => FilterMode::Linear,
    }
}

/// Map the mipmap mode encoded in a glTF minification filter.
pub fn map_mipmap_filter(filter: Option<MinFilter>) -> FilterMode {
    match filter {
        Some(MinFilter::NearestMipmapNearest) | Some(MinFilter::LinearMipmapNearest) => {
            FilterMode::Nearest
        }
        Some(MinFilter::NearestMipmapLinear) | Some(MinFilter::LinearMipmapLinear) => {
            FilterMode::Linear
        }
        _ => FilterMode::Linear,
    }
}

/// Map a glTF wrapping mode.
pub fn map_wrap(wrap: WrappingMode) -> AddressMode {
    match wrap {
        WrappingMode::Repeat => AddressMode::Repeat,
        WrappingMode::ClampToEdge => AddressMode::ClampToEdge,
        WrappingMode::MirroredRepeat => AddressMode::MirrorRepeat,
    }
}

/// Map an accessor's component type and dimensions to a hardware vertex
/// format.
///
/// Unsigned 8- and 16-bit components branch on `normalized` between the
/// Unorm and Uint families. Combinations without a hardware equivalent
/// (matrix dimensions) map to [`VertexFormat::Undefined`]; that is not an
/// error here.
pub fn map_attribute_format(
    data_type: DataType,
    dimensions: Dimensions,
    normalized: bool,
) -> VertexFormat {
    use VertexFormat::*;

    let arity = match dimensions {
        Dimensions::Scalar => 1,
        Dimensions::Vec2 => 2,
        Dimensions::Vec3 => 3,
        Dimensions::Vec4 => 4,
        _ => return Undefined,
    };

    match (data_type, arity, normalized) {
        (DataType::I8, 1, _) => R8Sint,
        (DataType::I8, 2, _) => Rg8Sint,
        (DataType::I8, 3, _) => Rgb8Sint,
        (DataType::I8, 4, _) => Rgba8Sint,

        (DataType::U8, 1, false) => R8Uint,
        (DataType::U8, 2, false) => Rg8Uint,
        (DataType::U8, 3, false) => Rgb8Uint,
        (DataType::U8, 4, false) => Rgba8Uint,
        (DataType::U8, 1, true) => R8Unorm,
        (DataType::U8, 2, true) => Rg8Unorm,
        (DataType::U8, 3, true) => Rgb8Unorm,
        (DataType::U8, 4, true) => Rgba8Unorm,

        (DataType::I16, 1, _) => R16Sint,
        (DataType::I16, 2, _) => Rg16Sint,
        (DataType::I16, 3, _) => Rgb16Sint,
        (DataType::I16, 4, _) => Rgba16Sint,

        (DataType::U16, 1, false) => R16Uint,
        (DataType::U16, 2, false) => Rg16Uint,
        (DataType::U16, 3, false) => Rgb16Uint,
        (DataType::U16, 4, false) => Rgba16Uint,
        (DataType::U16, 1, true) => R16Unorm,
        (DataType::U16, 2, true) => Rg16Unorm,
        (DataType::U16, 3, true) => Rgb16Unorm,
        (DataType::U16, 4, true) => Rgba16Unorm,

        (DataType::U32, 1, _) => R32Uint,
        (DataType::U32, 2, _) => Rg32Uint,
        (DataType::U32, 3, _) => Rgb32Uint,
        (DataType::U32, 4, _) => Rgba32Uint,

        (DataType::F32, 1, _) => R32Sfloat,
        (DataType::F32, 2, _) => Rg32Sfloat,
        (DataType::F32, 3, _) => Rgb32Sfloat,
        (DataType::F32, 4, _) => Rgba32Sfloat,

        _ => Undefined,
    }
}

/// Widen packed elements from `src_stride` to `dst_stride` bytes.
///
/// Copies `src_stride` bytes per element into the front of each
/// `dst_stride`-byte destination slot; trailing bytes stay zero. Used to
/// promote 1-byte indices to 2 bytes, since the hardware index type set has
/// no 8-bit member.
pub fn widen_elements(src: &[u8], src_stride: usize, dst_stride: usize) -> Vec<u8> {
    debug_assert!(src_stride <= dst_stride);
    let elem_count = src.len() / src_stride;
    let mut result = vec![0u8; elem_count * dst_stride];

    for (src_elem, dst_elem) in src
        .chunks_exact(src_stride)
        .zip(result.chunks_exact_mut(dst_stride))
    {
        dst_elem[..src_stride].copy_from_slice(src_elem);
    }

    result
}

/// Lower-case attribute name for a glTF semantic.
pub fn attribute_name(semantic: &gltf_dep::Semantic) -> String {
    use gltf_dep::Semantic;
    match semantic {
        Semantic::Positions => "position".to_string(),
        Semantic::Normals => "normal".to_string(),
        Semantic::Tangents => "tangent".to_string(),
        Semantic::Colors(set) => format!("color_{set}"),
        Semantic::TexCoords(set) => format!("texcoord_{set}"),
        Semantic::Joints(set) => format!("joints_{set}"),
        Semantic::Weights(set) => format!("weights_{set}"),
        Semantic::Extras(name) => name.to_lowercase(),
    }
}

/// Byte stride between the accessor's elements, accounting for interleaved
/// buffer views.
pub fn accessor_stride(accessor: &gltf_dep::Accessor<'_>) -> Result<usize, GltfError> {
    let view = accessor.view().ok_or_else(|| {
        GltfError::Accessor(format!(
            "accessor {} has no buffer view (sparse accessors are unsupported)",
            accessor.index()
        ))
    })?;
    Ok(view.stride().unwrap_or_else(|| accessor.size()))
}

/// Extract the raw bytes covered by an accessor.
///
/// Slices the owning buffer over `[start, start + count * stride)` where
/// `start` is the accessor offset plus its view offset. An out-of-range
/// buffer index or slice is a fatal lookup error.
pub fn read_accessor_bytes(
    accessor: &gltf_dep::Accessor<'_>,
    buffers: &[Vec<u8>],
) -> Result<Vec<u8>, GltfError> {
    let view = accessor.view().ok_or_else(|| {
        GltfError::Accessor(format!(
            "accessor {} has no buffer view (sparse accessors are unsupported)",
            accessor.index()
        ))
    })?;

    let buffer_index = view.buffer().index();
    let buffer = buffers.get(buffer_index).ok_or(GltfError::Lookup {
        what: "buffer",
        index: buffer_index,
    })?;

    let stride = view.stride().unwrap_or_else(|| accessor.size());
    let start = view.offset() + accessor.offset();
    let end = start + accessor.count() * stride;

    buffer
        .get(start..end)
        .map(<[u8]>::to_vec)
        .ok_or_else(|| {
            GltfError::Accessor(format!(
                "accessor {} spans {start}..{end} but buffer {buffer_index} has {} bytes",
                accessor.index(),
                buffer.len()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_filter_families() {
        assert_eq!(
            map_min_filter(Some(MinFilter::Nearest)),
            FilterMode::Nearest
        );
        assert_eq!(
            map_min_filter(Some(MinFilter::NearestMipmapLinear)),
            FilterMode::Nearest
        );
        assert_eq!(
            map_min_filter(Some(MinFilter::LinearMipmapNearest)),
            FilterMode::Linear
        );
        assert_eq!(map_min_filter(None), FilterMode::Linear);
    }

    #[test]
    fn mipmap_mode_from_min_filter() {
        assert_eq!(
            map_mipmap_filter(Some(MinFilter::LinearMipmapNearest)),
            FilterMode::Nearest
        );
        assert_eq!(
            map_mipmap_filter(Some(MinFilter::NearestMipmapLinear)),
            FilterMode::Linear
        );
        assert_eq!(map_mipmap_filter(Some(MinFilter::Nearest)), FilterMode::Linear);
        assert_eq!(map_mipmap_filter(None), FilterMode::Linear);
    }

    #[test]
    fn wrap_modes() {
        assert_eq!(map_wrap(WrappingMode::Repeat), AddressMode::Repeat);
        assert_eq!(map_wrap(WrappingMode::ClampToEdge), AddressMode::ClampToEdge);
        assert_eq!(
            map_wrap(WrappingMode::MirroredRepeat),
            AddressMode::MirrorRepeat
        );
    }

    #[test]
    fn attribute_format_covers_supported_set() {
        let data_types = [
            DataType::I8,
            DataType::U8,
            DataType::I16,
            DataType::U16,
            DataType::U32,
            DataType::F32,
        ];
        let dims = [
            Dimensions::Scalar,
            Dimensions::Vec2,
            Dimensions::Vec3,
            Dimensions::Vec4,
        ];
        for data_type in data_types {
            for dim in dims {
                for normalized in [false, true] {
                    let format = map_attribute_format(data_type, dim, normalized);
                    assert!(
                        !format.is_undefined(),
                        "{data_type:?} x {dim:?} (normalized={normalized}) mapped to Undefined"
                    );
                    // Pure function: same input, same output.
                    assert_eq!(format, map_attribute_format(data_type, dim, normalized));
                }
            }
        }
    }

    #[test]
    fn attribute_format_normalized_branch() {
        assert_eq!(
            map_attribute_format(DataType::U8, Dimensions::Vec4, true),
            VertexFormat::Rgba8Unorm
        );
        assert_eq!(
            map_attribute_format(DataType::U8, Dimensions::Vec4, false),
            VertexFormat::Rgba8Uint
        );
        assert_eq!(
            map_attribute_format(DataType::U16, Dimensions::Scalar, true),
            VertexFormat::R16Unorm
        );
        assert_eq!(
            map_attribute_format(DataType::U16, Dimensions::Scalar, false),
            VertexFormat::R16Uint
        );
    }

    #[test]
    fn attribute_format_matrix_is_undefined() {
        assert_eq!(
            map_attribute_format(DataType::F32, Dimensions::Mat4, false),
            VertexFormat::Undefined
        );
    }

    #[test]
    fn widen_preserves_low_bytes_in_order() {
        let src: Vec<u8> = vec![3, 1, 4, 1, 5, 9];
        let widened = widen_elements(&src, 1, 2);
        assert_eq!(widened.len(), 12);
        for (i, &byte) in src.iter().enumerate() {
            assert_eq!(widened[i * 2], byte, "low byte of element {i}");
            assert_eq!(widened[i * 2 + 1], 0, "high byte of element {i}");
        }
    }

    #[test]
    fn widen_empty_input() {
        assert!(widen_elements(&[], 1, 2).is_empty());
    }

    #[test]
    fn semantic_names_are_lower_case() {
        use gltf_dep::Semantic;
        assert_eq!(attribute_name(&Semantic::Positions), "position");
        assert_eq!(attribute_name(&Semantic::Normals), "normal");
        assert_eq!(attribute_name(&Semantic::TexCoords(0)), "texcoord_0");
        assert_eq!(attribute_name(&Semantic::Joints(1)), "joints_1");
    }
}
