use std::borrow::Cow;

use wgpu::naga::ShaderStage;

/// Kernel pacing constant folded into the `speed` uniform.
pub const KERNEL_RATE: f32 = 0.4;

/// Compiles the static full-screen triangle vertex shader shared by both passes.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fullscreen triangle vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    })
}

/// Compiles the plasma kernel.
pub(crate) fn compile_kernel_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("plasma kernel fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(KERNEL_SHADER_GLSL),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    })
}

/// Compiles the pass that stretches the render target over the presented surface.
pub(crate) fn compile_upscale_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("plasma upscale fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(UPSCALE_SHADER_GLSL),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    })
}

/// Minimal full-screen triangle vertex shader.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_uv = pos * 0.5 + vec2(0.5, 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";

/// Plasma kernel. The uniform block layout must match `PlasmaUniforms` in
/// `gpu/uniforms.rs`.
const KERNEL_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform PlasmaParams {
    vec2 resolution;
    float time;
    float speed;
    vec3 customColor;
    float useCustomColor;
    vec2 mouse;
    float directionSign;
    float scale;
    float opacity;
    float mouseInteractive;
    vec2 _padding;
} ubo;

vec3 plasma(vec2 C) {
    vec2 r = ubo.resolution;
    vec2 center = r * 0.5;
    C = (C - center) / ubo.scale + center;

    vec2 mouseOffset = (ubo.mouse - center) * 0.0002;
    C += mouseOffset * length(C - center) * step(0.5, ubo.mouseInteractive);

    float T = ubo.time * ubo.speed * ubo.directionSign;
    float d = 0.0;
    float z = 0.0;
    vec4 o = vec4(0.0);
    vec3 O = vec3(0.0);

    for (int i = 1; i < 40; i++) {
        vec3 p = z * normalize(vec3(C - 0.5 * r, r.y));
        p.z -= 4.0;
        vec3 S = p;
        d = p.y - T;

        p.x += 0.4 * (1.0 + p.y) * sin(d + p.x * 0.1) * cos(0.34 * d + p.x * 0.05);
        vec4 m = cos(p.y + vec4(0.0, 11.0, 33.0, 0.0) - T);
        vec2 Q = p.xz * mat2(m.xy, m.zw);
        p.x = Q.x;
        p.z = Q.y;

        d = abs(sqrt(length(Q * Q)) - 0.25 * (5.0 + S.y)) / 3.0 + 8e-4;
        z += d;
        o = 1.0 + sin(S.y + p.z * 0.5 + S.z - length(S - p) + vec4(2.0, 1.0, 0.0, 8.0));
        O += o.w / d * o.xyz;
    }

    return tanh(O / 1e4);
}

float finiteOrZero(float x) {
    return (isnan(x) || isinf(x)) ? 0.0 : x;
}

void main() {
    // Kernel coordinates use a bottom-left origin.
    vec2 fragCoord = vec2(gl_FragCoord.x, ubo.resolution.y - gl_FragCoord.y);
    vec3 raw = plasma(fragCoord);
    vec3 rgb = vec3(finiteOrZero(raw.r), finiteOrZero(raw.g), finiteOrZero(raw.b));

    float intensity = (rgb.r + rgb.g + rgb.b) / 3.0;
    vec3 tinted = intensity * ubo.customColor;
    vec3 finalColor = mix(rgb, tinted, step(0.5, ubo.useCustomColor));

    float alpha = length(rgb) * ubo.opacity;
    outColor = vec4(finalColor, alpha);
}
";

/// Samples the render target and emits premultiplied color.
const UPSCALE_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(set = 0, binding = 0) uniform texture2D plasma_frame;
layout(set = 0, binding = 1) uniform sampler plasma_sampler;

void main() {
    vec2 uv = vec2(v_uv.x, 1.0 - v_uv.y);
    vec4 color = texture(sampler2D(plasma_frame, plasma_sampler), uv);
    float alpha = clamp(color.a, 0.0, 1.0);
    outColor = vec4(color.rgb * alpha, alpha);
}
";

#[cfg(test)]
mod tests {
    use wgpu::naga::front::glsl::{Frontend, Options};
    use wgpu::naga::valid::{Capabilities, ValidationFlags, Validator};
    use wgpu::naga::{Expression, Module, RelationalFunction};

    use super::*;

    fn parse(stage: ShaderStage, source: &str) -> Module {
        Frontend::default()
            .parse(&Options::from(stage), source)
            .unwrap_or_else(|err| panic!("GLSL parse failed: {err:?}"))
    }

    fn validate(stage: ShaderStage, source: &str) {
        let module = parse(stage, source);
        Validator::new(ValidationFlags::all(), Capabilities::all())
            .validate(&module)
            .unwrap_or_else(|err| panic!("validation failed: {err:?}"));
    }

    fn uses_relational(module: &Module, wanted: RelationalFunction) -> bool {
        module
            .functions
            .iter()
            .flat_map(|(_, function)| function.expressions.iter())
            .chain(module.entry_points.iter().flat_map(|entry| entry.function.expressions.iter()))
            .any(|(_, expression)| {
                matches!(expression, Expression::Relational { fun, .. } if *fun == wanted)
            })
    }

    #[test]
    fn vertex_shader_validates() {
        validate(ShaderStage::Vertex, VERTEX_SHADER_GLSL);
    }

    #[test]
    fn kernel_shader_validates() {
        validate(ShaderStage::Fragment, KERNEL_SHADER_GLSL);
    }

    #[test]
    fn upscale_shader_validates() {
        validate(ShaderStage::Fragment, UPSCALE_SHADER_GLSL);
    }

    #[test]
    fn kernel_filters_non_finite_channels_with_builtins() {
        let module = parse(ShaderStage::Fragment, KERNEL_SHADER_GLSL);
        assert!(uses_relational(&module, RelationalFunction::IsNan));
        assert!(uses_relational(&module, RelationalFunction::IsInf));
    }

    #[test]
    fn kernel_declares_every_uniform() {
        for name in [
            "resolution",
            "time",
            "speed",
            "customColor",
            "useCustomColor",
            "mouse",
            "directionSign",
            "scale",
            "opacity",
            "mouseInteractive",
        ] {
            assert!(KERNEL_SHADER_GLSL.contains(name), "missing uniform {name}");
        }
    }
}
