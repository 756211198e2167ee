/// Terminal front-end: renders a loaded scene as a spinning wireframe
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use objview_core::{draw_wireframe, Camera, Scene, SceneRotation, Transform};
use std::io::{self, stdout, Write};
use std::time::Duration;
use tracing::{debug, info, warn};

pub mod clock;
pub mod config;
pub mod renderer;

pub use clock::FrameClock;
pub use config::Config;
pub use renderer::{viewport_dim, AsciiRenderer};

/// Terminal cells are roughly twice as tall as they are wide
pub const CELL_ASPECT: u32 = 2;

/// Scene, camera and back buffer for one view; no terminal I/O
pub struct Viewer {
    scene: Scene,
    camera: Camera,
    rotation: SceneRotation,
    renderer: AsciiRenderer,
}

impl Viewer {
    pub fn new(
        scene: Scene,
        camera: Camera,
        rotation: SceneRotation,
        width: usize,
        height: usize,
    ) -> Self {
        let mut viewer = Self {
            scene,
            camera,
            rotation,
            renderer: AsciiRenderer::new(width, height),
        };
        viewer.resize(width, height);
        viewer
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn rotation(&self) -> &SceneRotation {
        &self.rotation
    }

    pub fn renderer(&self) -> &AsciiRenderer {
        &self.renderer
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.renderer.resize(width, height);
        self.camera.set_viewport(
            viewport_dim(width),
            viewport_dim(height).saturating_mul(CELL_ASPECT),
        );
    }

    /// Clear, advance the rotation, and draw every face into the back buffer
    pub fn render_frame(&mut self) {
        self.renderer.clear();

        self.rotation.advance();
        let model_view = Transform::model_view(&self.camera.position, &self.rotation);
        let mvp = Transform::mvp_matrix(&model_view, &self.camera.projection_matrix());
        self.renderer.set_transform(mvp);

        draw_wireframe(&self.scene, &mut self.renderer);
    }
}

/// Raw mode and alternate screen, restored on drop even if the loop panics
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let guard = Self;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show) {
            warn!("failed to leave alternate screen: {err}");
        }
        if let Err(err) = terminal::disable_raw_mode() {
            warn!("failed to disable raw mode: {err}");
        }
    }
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    viewer: Viewer,
    clock: FrameClock,
    running: bool,
    frame_limit: Option<u64>,
}

impl TerminalApp {
    pub fn new(scene: Scene, config: &Config) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let camera = config.camera(u32::from(width), u32::from(height) * CELL_ASPECT);
        let rotation = SceneRotation::new(config.rotate_speed());

        Ok(Self {
            viewer: Viewer::new(scene, camera, rotation, usize::from(width), usize::from(height)),
            clock: FrameClock::new(config.target_fps()),
            running: true,
            frame_limit: None,
        })
    }

    /// Stop on its own after `limit` frames
    pub fn with_frame_limit(mut self, limit: Option<u64>) -> Self {
        self.frame_limit = limit;
        self
    }

    pub fn run(&mut self) -> io::Result<()> {
        let guard = TerminalGuard::enter()?;
        let result = self.main_loop();
        drop(guard);

        info!(frames = self.clock.frames(), "render loop finished");
        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        info!(
            width = self.viewer.renderer().width(),
            height = self.viewer.renderer().height(),
            target = ?self.clock.target(),
            "render loop started"
        );

        while self.running {
            self.clock.begin_frame();

            while event::poll(Duration::ZERO)? {
                let event = event::read()?;
                self.handle_event(event);
            }
            if !self.running {
                break;
            }

            self.viewer.render_frame();
            self.present()?;

            let frames = self.clock.end_frame();
            if self.frame_limit.is_some_and(|limit| frames >= limit) {
                self.running = false;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent {
                code,
                modifiers,
                kind: KeyEventKind::Press,
                ..
            }) => match code {
                KeyCode::Char('q') | KeyCode::Esc => self.running = false,
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    self.running = false
                }
                _ => {}
            },
            Event::Resize(width, height) => {
                debug!(width, height, "terminal resized");
                self.viewer.resize(usize::from(width), usize::from(height));
            }
            _ => {}
        }
    }

    fn present(&self) -> io::Result<()> {
        let mut stdout = stdout().lock();
        self.viewer.renderer().draw(&mut stdout)?;

        // Draw UI overlay
        let scene = self.viewer.scene();
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "objview | {} objects, {} faces | {:>5.1} deg | FPS: {:.1} | Q/Esc=Quit",
                scene.objects().len(),
                scene.face_count(),
                self.viewer.rotation().angle(),
                self.clock.fps()
            )),
            ResetColor
        )?;

        stdout.flush()
    }
}
