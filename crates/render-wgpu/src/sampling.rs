use station_render::{AddressMode, FilterLevel, SamplerState, TextureImage};

/// Max anisotropy used when both min and mag ask for it.
pub(crate) const MAX_ANISOTROPY: u16 = 16;

fn filter_mode(level: FilterLevel) -> wgpu::FilterMode {
    match level {
        FilterLevel::Point => wgpu::FilterMode::Nearest,
        FilterLevel::Linear | FilterLevel::Anisotropic => wgpu::FilterMode::Linear,
    }
}

fn address_mode(mode: AddressMode) -> wgpu::AddressMode {
    match mode {
        AddressMode::Wrap => wgpu::AddressMode::Repeat,
        AddressMode::Clamp => wgpu::AddressMode::ClampToEdge,
    }
}

/// Anisotropic filtering applies only when min and mag both request it; it
/// forces every stage to linear. Otherwise each stage maps on its own, with
/// anisotropic treated as linear.
pub(crate) fn sampler_descriptor(state: &SamplerState) -> wgpu::SamplerDescriptor<'static> {
    let filters = state.filters;
    let anisotropic =
        filters.min == FilterLevel::Anisotropic && filters.mag == FilterLevel::Anisotropic;
    let (min, mag, mip, anisotropy_clamp) = if anisotropic {
        (
            wgpu::FilterMode::Linear,
            wgpu::FilterMode::Linear,
            wgpu::FilterMode::Linear,
            MAX_ANISOTROPY,
        )
    } else {
        (
            filter_mode(filters.min),
            filter_mode(filters.mag),
            filter_mode(filters.mip),
            1,
        )
    };
    wgpu::SamplerDescriptor {
        label: Some("station_sampler"),
        address_mode_u: address_mode(state.address_u),
        address_mode_v: address_mode(state.address_v),
        address_mode_w: address_mode(state.address_v),
        mag_filter: mag,
        min_filter: min,
        mipmap_filter: mip,
        anisotropy_clamp,
        ..Default::default()
    }
}

/// Box-filtered mip chain, level 0 first, down to 1×1.
pub(crate) fn mip_chain(image: &TextureImage) -> Vec<(u32, u32, Vec<u8>)> {
    let mut levels = vec![(image.width, image.height, image.rgba.clone())];
    loop {
        let Some((w, h, pixels)) = levels.last() else {
            break;
        };
        if *w == 1 && *h == 1 {
            break;
        }
        let (w, h) = (*w, *h);
        let (nw, nh) = ((w / 2).max(1), (h / 2).max(1));
        let mut next = Vec::with_capacity((nw * nh * 4) as usize);
        for y in 0..nh {
            for x in 0..nw {
                for channel in 0..4 {
                    let mut sum = 0u32;
                    for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                        let sx = (x * 2 + dx).min(w - 1);
                        let sy = (y * 2 + dy).min(h - 1);
                        sum += u32::from(pixels[((sy * w + sx) * 4 + channel) as usize]);
                    }
                    next.push((sum / 4) as u8);
                }
            }
        }
        levels.push((nw, nh, next));
    }
    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use station_common::Color;
    use station_render::FilterSet;

    #[test]
    fn anisotropic_needs_min_and_mag() {
        let desc = sampler_descriptor(&SamplerState::wrap(FilterSet::default()));
        assert_eq!(desc.anisotropy_clamp, MAX_ANISOTROPY);
        assert_eq!(desc.mipmap_filter, wgpu::FilterMode::Linear);

        let mut filters = FilterSet::default();
        filters.mag = FilterLevel::Point;
        let desc = sampler_descriptor(&SamplerState::wrap(filters));
        assert_eq!(desc.anisotropy_clamp, 1);
        assert_eq!(desc.mag_filter, wgpu::FilterMode::Nearest);
        assert_eq!(desc.min_filter, wgpu::FilterMode::Linear);
    }

    #[test]
    fn wrap_u_clamps_v() {
        let desc = sampler_descriptor(&SamplerState::wrap_u(FilterSet::uniform(FilterLevel::Point)));
        assert_eq!(desc.address_mode_u, wgpu::AddressMode::Repeat);
        assert_eq!(desc.address_mode_v, wgpu::AddressMode::ClampToEdge);
        assert_eq!(desc.mipmap_filter, wgpu::FilterMode::Nearest);
    }

    #[test]
    fn mip_chain_reaches_one_pixel() {
        let image = TextureImage::solid(8, 2, Color::rgb(200, 100, 50));
        let chain = mip_chain(&image);
        let sizes: Vec<(u32, u32)> = chain.iter().map(|(w, h, _)| (*w, *h)).collect();
        assert_eq!(sizes, [(8, 2), (4, 1), (2, 1), (1, 1)]);
        assert_eq!(chain[3].2, vec![200, 100, 50, 255]);
    }
}
