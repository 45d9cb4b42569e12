use image::RgbaImage;
use image::imageops::{self, FilterType};
use realm_common::TextureImage;
use realm_render::{TextureSettings, TextureSlot, Wrap};

/// A sampled texture ready to bind.
pub(crate) struct GpuTexture {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// Levels in a full mip chain down to 1x1.
pub(crate) fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Box-filtered mip chain, level 0 first.
pub(crate) fn mip_chain(image: &TextureImage) -> Vec<RgbaImage> {
    let Some(base) = RgbaImage::from_raw(image.width, image.height, image.rgba.clone()) else {
        return Vec::new();
    };
    let levels = mip_level_count(image.width, image.height);
    let mut chain = Vec::with_capacity(levels as usize);
    chain.push(base);
    for _ in 1..levels {
        let Some(prev) = chain.last() else { break };
        let w = (prev.width() / 2).max(1);
        let h = (prev.height() / 2).max(1);
        let next = imageops::resize(prev, w, h, FilterType::Triangle);
        chain.push(next);
    }
    chain
}

pub(crate) fn address_mode(wrap: Wrap) -> wgpu::AddressMode {
    match wrap {
        Wrap::Repeat => wgpu::AddressMode::Repeat,
        Wrap::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
        Wrap::ClampToEdge => wgpu::AddressMode::ClampToEdge,
    }
}

pub(crate) fn texture_format(slot: TextureSlot) -> wgpu::TextureFormat {
    if slot.is_srgb() {
        wgpu::TextureFormat::Rgba8UnormSrgb
    } else {
        wgpu::TextureFormat::Rgba8Unorm
    }
}

/// Pixel shown in a slot before its texture arrives.
pub(crate) fn placeholder_pixel(slot: TextureSlot) -> [u8; 4] {
    match slot {
        TextureSlot::Color => [255, 255, 255, 255],
        // Flat tangent-space normal.
        TextureSlot::Normal => [128, 128, 255, 255],
        TextureSlot::Roughness => [255, 255, 255, 255],
    }
}

fn create_sampler(device: &wgpu::Device, settings: &TextureSettings, max_anisotropy: u16) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("material_sampler"),
        address_mode_u: address_mode(settings.wrap_u),
        address_mode_v: address_mode(settings.wrap_v),
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        anisotropy_clamp: settings.anisotropy.clamp(1, max_anisotropy.max(1)),
        ..Default::default()
    })
}

/// Upload `image` with a full mip chain for `slot`.
pub(crate) fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    slot: TextureSlot,
    image: &TextureImage,
    settings: &TextureSettings,
    max_anisotropy: u16,
) -> GpuTexture {
    let chain = mip_chain(image);
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(slot.name()),
        size: wgpu::Extent3d {
            width: image.width.max(1),
            height: image.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: chain.len().max(1) as u32,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: texture_format(slot),
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    for (level, mip) in chain.iter().enumerate() {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: level as u32,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            mip.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * mip.width()),
                rows_per_image: Some(mip.height()),
            },
            wgpu::Extent3d {
                width: mip.width(),
                height: mip.height(),
                depth_or_array_layers: 1,
            },
        );
    }

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = create_sampler(device, settings, max_anisotropy);
    GpuTexture {
        _texture: texture,
        view,
        sampler,
    }
}

/// 1x1 stand-in for `slot`.
pub(crate) fn placeholder(device: &wgpu::Device, queue: &wgpu::Queue, slot: TextureSlot) -> GpuTexture {
    upload(
        device,
        queue,
        slot,
        &TextureImage::solid(placeholder_pixel(slot)),
        &TextureSettings::default(),
        1,
    )
}
