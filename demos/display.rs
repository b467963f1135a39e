//! Display data supporting the array-description protocol.
//!
//! Usage:
//!
//! ```text
//! cargo run --example display [filename]
//! ```
//!
//! With a filename, the image is decoded and displayed. Without one, a
//! generated RGBA gradient is animated in place and pushed to the GPU
//! every frame through `ArrayTexture::refresh`. A checkerboard is
//! rendered behind the image so transparent areas stay visible.

use std::sync::Arc;

use arraytex::{ArrayTexture, CopyPolicy, GpuContext, RawArray, TextureBlitter};
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

const GENERATED_WIDTH: u32 = 320;
const GENERATED_HEIGHT: u32 = 240;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let path = std::env::args().nth(1);
    let (width, height, mut pixels) = match &path {
        Some(path) => {
            let img = image::open(path)?.to_rgba8();
            let (w, h) = img.dimensions();
            (w, h, img.into_raw())
        },
        None => {
            let mut pixels = vec![0u8; (GENERATED_WIDTH * GENERATED_HEIGHT * 4) as usize];
            fill_gradient(&mut pixels, GENERATED_WIDTH, GENERATED_HEIGHT, 0);
            (GENERATED_WIDTH, GENERATED_HEIGHT, pixels)
        },
    };
    let shape = [height as usize, width as usize, 4];

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("arraytex display")
            .with_inner_size(LogicalSize::new(width, height))
            .build(&event_loop)?,
    );

    let ctx = GpuContext::new_blocking()?;
    let surface = ctx.instance().create_surface(window.clone())?;
    let mut config = surface
        .get_default_config(ctx.adapter(), width, height)
        .ok_or("surface is not supported by this adapter")?;
    surface.configure(ctx.device(), &config);

    // The array texture never needs a copy: the buffer is packed RGBA.
    let mut array_tex = ArrayTexture::new(
        ctx.device(),
        ctx.queue(),
        &RawArray::new(&pixels, shape),
        CopyPolicy::Forbid,
    )?;

    let checks = checkerboard(width, height);
    let checks_tex = ArrayTexture::new(
        ctx.device(),
        ctx.queue(),
        &RawArray::from_pod(&checks, shape),
        CopyPolicy::Forbid,
    )?;

    let blitter = TextureBlitter::new(ctx.device(), config.format);
    let background_bind = blitter.bind(ctx.device(), checks_tex.view());
    let image_bind = blitter.bind(ctx.device(), array_tex.view());

    let animate = path.is_none();
    let mut frame: u32 = 0;

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(size) if size.width > 0 && size.height > 0 => {
                    config.width = size.width;
                    config.height = size.height;
                    surface.configure(ctx.device(), &config);
                },
                WindowEvent::RedrawRequested => {
                    if animate {
                        frame = frame.wrapping_add(1);
                        fill_gradient(&mut pixels, width, height, frame);
                        if let Err(err) =
                            array_tex.refresh(ctx.queue(), &RawArray::new(&pixels, shape))
                        {
                            log::error!("refresh failed: {err}");
                            elwt.exit();
                            return;
                        }
                    }

                    let output = match surface.get_current_texture() {
                        Ok(output) => output,
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            surface.configure(ctx.device(), &config);
                            return;
                        },
                        Err(err) => {
                            log::error!("surface error: {err}");
                            return;
                        },
                    };
                    let view = output
                        .texture
                        .create_view(&wgpu::TextureViewDescriptor::default());

                    let mut encoder =
                        ctx.device()
                            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                                label: Some("Display Encoder"),
                            });
                    {
                        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                            label: Some("Display Pass"),
                            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                                view: &view,
                                resolve_target: None,
                                ops: wgpu::Operations {
                                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                                    store: wgpu::StoreOp::Store,
                                },
                            })],
                            depth_stencil_attachment: None,
                            timestamp_writes: None,
                            occlusion_query_set: None,
                        });
                        blitter.draw(&mut pass, &background_bind);
                        blitter.draw(&mut pass, &image_bind);
                    }
                    ctx.queue().submit(std::iter::once(encoder.finish()));
                    output.present();
                },
                _ => {},
            },
            Event::AboutToWait => window.request_redraw(),
            _ => {},
        }
    })?;

    Ok(())
}

/// Animated RGBA gradient with alpha rising left to right, so the
/// checkerboard stays visible on the left edge.
fn fill_gradient(pixels: &mut [u8], width: u32, height: u32, frame: u32) {
    for y in 0..height {
        for x in 0..width {
            let i = ((y * width + x) * 4) as usize;
            pixels[i] = (x.wrapping_add(frame) % 256) as u8;
            pixels[i + 1] = (y.wrapping_add(frame) % 256) as u8;
            pixels[i + 2] = (frame % 256) as u8;
            pixels[i + 3] = (x * 255 / width.max(1)) as u8;
        }
    }
}

/// Opaque two-tone checkerboard, 32px tiles.
fn checkerboard(width: u32, height: u32) -> Vec<[u8; 4]> {
    let mut pixels = vec![[0u8; 4]; (width * height) as usize];
    for y in 0..height {
        for x in 0..width {
            let light = ((x / 32) + (y / 32)) % 2 == 0;
            let tone = if light { 0xcc } else { 0x66 };
            pixels[(y * width + x) as usize] = [tone, tone, tone, 0xff];
        }
    }
    pixels
}
