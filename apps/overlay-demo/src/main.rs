use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use focus_core::ElementId;
use focus_overlay::{
    Easing, FocusOverlay, HostCapabilities, LifecycleEvent, OverlayConfig, OverlayError,
};
use focus_runtime_std::StdRuntime;
use focus_testing::{HostEventBus, RecordingHost, SceneTree};
use focus_ui_graphics::Rect;

const FRAME: Duration = Duration::from_millis(16);
const STEP_TIMEOUT: Duration = Duration::from_secs(2);
const TILES_PER_ROW: usize = 5;

/// A TV home screen: a menu bar above two rows of poster tiles.
struct HomeScreen {
    menu: Vec<ElementId>,
    rows: Vec<ElementId>,
    tiles: Vec<Vec<ElementId>>,
}

impl HomeScreen {
    fn build(scene: &SceneTree) -> Self {
        let menu = (0..3)
            .map(|i| scene.add_element(None, Rect::new(80.0 + 220.0 * i as f32, 40.0, 180.0, 56.0)))
            .collect();
        let mut rows = Vec::new();
        let mut tiles = Vec::new();
        for row in 0..2 {
            let top = 160.0 + 300.0 * row as f32;
            let container = scene.add_container(None, Rect::new(60.0, top, 1800.0, 260.0));
            let row_tiles: Vec<ElementId> = (0..TILES_PER_ROW)
                .map(|i| {
                    scene.add_element(
                        Some(container),
                        Rect::new(80.0 + 340.0 * i as f32, top + 20.0, 320.0, 220.0),
                    )
                })
                .collect();
            rows.push(container);
            tiles.push(row_tiles);
        }
        Self { menu, rows, tiles }
    }
}

enum Step {
    /// D-pad move onto a plain element.
    Focus(ElementId),
    /// D-pad move inside a row; the row reports its new selection.
    Select { row: ElementId, tile: ElementId },
    /// D-pad move from outside into a row.
    Enter { row: ElementId, tile: ElementId },
}

fn main() {
    env_logger::init();

    let animated = !std::env::args().any(|arg| arg == "--no-animation");
    println!("=== Focus Overlay Demo ===");
    println!("Walks a focus indicator across a headless TV home screen.");
    println!("Pass --no-animation to snap instead of animate; RUST_LOG=debug for engine logs.");
    println!();

    if let Err(err) = run(animated) {
        log::error!("demo failed: {err}");
        std::process::exit(1);
    }
}

fn run(animated: bool) -> Result<(), OverlayError> {
    let runtime = StdRuntime::new();
    let events = HostEventBus::new();
    let scene = Rc::new(SceneTree::with_events(events.clone()));
    let host = Rc::new(RecordingHost::new());
    let screen = HomeScreen::build(&scene);

    let config = OverlayConfig::default()
        .with_animations_enabled(animated)
        .with_easing(Easing::FastOutSlowIn)
        .with_animation_duration(180)?;
    let overlay = FocusOverlay::new(
        HostCapabilities {
            probe: scene.clone(),
            hierarchy: scene.clone(),
            host: host.clone(),
            requester: Some(scene.clone()),
        },
        config,
        runtime.runtime_handle(),
    )?;
    overlay.bind(Rc::new(events.clone()), Rc::new(events.clone()))?;
    overlay.add_focus_listener(|old, new| log::info!("focus {old:?} -> {new:?}"))?;

    overlay.set_initial_focus(Some(screen.menu[0]))?;
    events.emit_lifecycle(LifecycleEvent::BecameVisible);
    run_until_idle(&runtime, &overlay);
    report("initial focus", &overlay, &host);

    let steps = vec![
        ("right", Step::Focus(screen.menu[1])),
        ("right", Step::Focus(screen.menu[2])),
        (
            "down",
            Step::Enter {
                row: screen.rows[0],
                tile: screen.tiles[0][2],
            },
        ),
        (
            "right",
            Step::Select {
                row: screen.rows[0],
                tile: screen.tiles[0][3],
            },
        ),
        (
            "down",
            Step::Enter {
                row: screen.rows[1],
                tile: screen.tiles[1][3],
            },
        ),
        ("up", Step::Focus(screen.menu[1])),
    ];

    for (key, step) in steps {
        match step {
            Step::Focus(element) => scene.focus(element),
            Step::Select { row, tile } => overlay.on_selection_changed(row, Some(tile))?,
            Step::Enter { row, tile } => {
                scene.focus(tile);
                overlay.on_selection_changed(row, Some(tile))?;
            }
        }
        run_until_idle(&runtime, &overlay);
        report(key, &overlay, &host);
    }

    events.emit_lifecycle(LifecycleEvent::Destroyed);
    println!();
    println!(
        "screen destroyed; overlay disposed = {}, {} geometry writes in total",
        overlay.is_disposed(),
        host.writes().len()
    );
    Ok(())
}

/// Pumps the runtime until no task, delayed task or animation frame is left.
fn run_until_idle(runtime: &StdRuntime, overlay: &FocusOverlay) {
    let started = Instant::now();
    loop {
        let busy = runtime.pump();
        let next_deadline = runtime.time_until_next_deadline();
        if !busy && !overlay.is_animating() && next_deadline.is_none() {
            break;
        }
        if started.elapsed() > STEP_TIMEOUT {
            log::warn!("runtime still busy after {STEP_TIMEOUT:?}; moving on");
            break;
        }
        let sleep = next_deadline.map_or(FRAME, |deadline| deadline.min(FRAME));
        thread::sleep(sleep);
    }
}

fn report(key: &str, overlay: &FocusOverlay, host: &RecordingHost) {
    match (overlay.focused_element(), overlay.overlay_rectangle()) {
        (Some(element), Some(rect)) => println!(
            "{key:>13}: overlay wraps {element} at ({:.0}, {:.0}) {:.0}x{:.0} after {} writes",
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            host.writes().len()
        ),
        _ => println!("{key:>13}: no overlay yet"),
    }
}
