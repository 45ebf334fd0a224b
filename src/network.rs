//! Network Visualizations
//!
//! Two pictures of a small fully connected network:
//!
//! - [`AnimatedNetwork`] animates signal flowing forward through the layers,
//!   then error flowing backward, computing real sigmoid activations and
//!   deltas at the end of each phase.
//! - [`StaticNetwork`] is the hoverable diagram: pointing at a neuron
//!   highlights its incoming and outgoing connections.
//!
//! ## Layout
//!
//! ```text
//! layer l  at x = width  / (L + 1) × (l + 1)
//! neuron n at y = height / (size_l + 1) × (n + 1)
//! ```
//!
//! ## Animation
//!
//! Each phase lasts `max_steps` ticks. During the forward phase the "front"
//! sweeps left to right one layer per `max_steps / L` ticks; connections behind
//! it are fully lit and those leaving the front layer are partially lit. The
//! backward phase mirrors this right to left.
//!
//! ```text
//! Forward ──(max_steps ticks, then forward_pass)──▶ Backward
//!    ▲                                                 │
//!    └──(max_steps ticks, then backward_pass, new inputs)
//! ```

use crate::activation::sigmoid;
use crate::optimizer::Vec2;
use crate::render::{DrawCommand, Stroke, Surface, TextAlign};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Target used for the output error during the backward pass
pub const TARGET: f64 = 1.0;

/// Default layer sizes for the animated network
pub const ANIMATED_LAYERS: [usize; 4] = [2, 3, 2, 1];

/// Default layer sizes for the static diagram
pub const STATIC_LAYERS: [usize; 4] = [3, 4, 4, 2];

/// Hit radius for mouse hover
pub const HOVER_RADIUS: f64 = 25.0;

/// Hit radius while touching (larger finger target)
pub const TOUCH_RADIUS: f64 = 35.0;

const STEP_FORWARD_FRAMES: usize = 10;

const FORWARD_COLOR: &str = "#4ecdc4";
const BACKWARD_COLOR: &str = "#c44569";
const NEUTRAL_COLOR: &str = "rgba(255,255,255,0.1)";
const ACTIVE_COLOR: &str = "#d4a853";
const INACTIVE_COLOR: &str = "#2a2a36";
const LAYER_COLORS: [&str; 4] = ["#4ecdc4", "#5b7cfa", "#c44569", "#d4a853"];

/// A neuron and its latest forward/backward values
#[derive(Clone, Debug, PartialEq)]
pub struct Neuron {
    pub layer: usize,
    pub index: usize,
    pub position: Vec2,
    pub value: f64,
    pub gradient: f64,
    pub activated: bool,
}

/// Which way a connection is lit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    None,
    Forward,
    Backward,
}

/// A weighted edge between neurons in adjacent layers
#[derive(Clone, Debug, PartialEq)]
pub struct Connection {
    /// Index into the neuron list
    pub from: usize,
    /// Index into the neuron list
    pub to: usize,
    pub weight: f64,
    /// Fraction of the edge lit, 0..=1
    pub flow_progress: f64,
    pub flow: Flow,
}

/// Animation phase
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Forward,
    Backward,
}

/// Lay out neurons layer by layer
///
/// Neurons are returned layer-major: all of layer 0, then layer 1, and so on.
pub fn layout(layers: &[usize], width: f64, height: f64) -> Vec<Neuron> {
    let layer_spacing = width / (layers.len() + 1) as f64;
    let mut neurons = Vec::with_capacity(layers.iter().sum());

    for (l, &size) in layers.iter().enumerate() {
        let x = layer_spacing * (l + 1) as f64;
        let spacing = height / (size + 1) as f64;
        for n in 0..size {
            neurons.push(Neuron {
                layer: l,
                index: n,
                position: Vec2::new(x, spacing * (n + 1) as f64),
                value: 0.0,
                gradient: 0.0,
                activated: false,
            });
        }
    }
    neurons
}

/// Label under layer `l` of an `n`-layer network
pub fn layer_label(l: usize, n: usize) -> String {
    if l == 0 {
        "Input".to_string()
    } else if l + 1 == n {
        "Output".to_string()
    } else {
        format!("Hidden {}", l)
    }
}

/// Animated forward/backward pass
pub struct AnimatedNetwork {
    layers: Vec<usize>,
    neurons: Vec<Neuron>,
    connections: Vec<Connection>,
    phase: Phase,
    running: bool,
    step: usize,
    max_steps: usize,
    width: f64,
    height: f64,
    rng: StdRng,
}

impl AnimatedNetwork {
    /// Build a network with random weights and inputs
    pub fn new(layers: &[usize], width: f64, height: f64) -> Self {
        Self::with_seed(layers, width, height, rand::rng().random())
    }

    /// Build a reproducible network
    pub fn with_seed(layers: &[usize], width: f64, height: f64, seed: u64) -> Self {
        let mut network = Self {
            layers: layers.to_vec(),
            neurons: Vec::new(),
            connections: Vec::new(),
            phase: Phase::Forward,
            running: false,
            step: 0,
            max_steps: 100,
            width,
            height,
            rng: StdRng::seed_from_u64(seed),
        };
        network.build();
        network.randomize_inputs();
        network
    }

    /// Recompute layout for a new canvas size
    ///
    /// Rebuilding draws fresh weights, as the page does on resize.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.build();
        self.randomize_inputs();
    }

    fn build(&mut self) {
        self.neurons = layout(&self.layers, self.width, self.height);
        self.connections.clear();

        let mut offset = 0;
        for l in 0..self.layers.len().saturating_sub(1) {
            let next_offset = offset + self.layers[l];
            for from in offset..next_offset {
                for to in next_offset..next_offset + self.layers[l + 1] {
                    self.connections.push(Connection {
                        from,
                        to,
                        weight: self.rng.random_range(-1.0..1.0),
                        flow_progress: 0.0,
                        flow: Flow::None,
                    });
                }
            }
            offset = next_offset;
        }
    }

    /// Fresh random input values in [0, 1)
    pub fn randomize_inputs(&mut self) {
        for neuron in self.neurons.iter_mut().filter(|n| n.layer == 0) {
            neuron.value = self.rng.random();
        }
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Neurons in the output layer
    pub fn outputs(&self) -> impl Iterator<Item = &Neuron> {
        let last = self.layers.len().saturating_sub(1);
        self.neurons.iter().filter(move |n| n.layer == last)
    }

    /// Propagate input values to the output
    pub fn forward_pass(&mut self) {
        for l in 1..self.layers.len() {
            for n in 0..self.neurons.len() {
                if self.neurons[n].layer != l {
                    continue;
                }
                let sum: f64 = self
                    .connections
                    .iter()
                    .filter(|c| c.to == n)
                    .map(|c| self.neurons[c.from].value * c.weight)
                    .sum();
                self.neurons[n].value = sigmoid(sum);
            }
        }
    }

    /// Propagate the output error back to every neuron
    ///
    /// Uses squared error against [`TARGET`]:
    ///
    /// ```text
    /// output:  δ = (a - target) · a(1 - a)
    /// hidden:  δ = (Σ δ_next · w) · a(1 - a)
    /// ```
    pub fn backward_pass(&mut self) {
        let last = self.layers.len().saturating_sub(1);
        for neuron in self.neurons.iter_mut().filter(|n| n.layer == last) {
            let a = neuron.value;
            neuron.gradient = (a - TARGET) * a * (1.0 - a);
        }

        for l in (0..last).rev() {
            for n in 0..self.neurons.len() {
                if self.neurons[n].layer != l {
                    continue;
                }
                let grad_sum: f64 = self
                    .connections
                    .iter()
                    .filter(|c| c.from == n)
                    .map(|c| self.neurons[c.to].gradient * c.weight)
                    .sum();
                let a = self.neurons[n].value;
                self.neurons[n].gradient = grad_sum * a * (1.0 - a);
            }
        }
    }

    pub fn play(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Advance one animation frame
    ///
    /// # Returns
    ///
    /// `false` if paused (nothing happened).
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.advance(1);
        true
    }

    /// Pause and jump ahead by ten frames
    pub fn step_forward(&mut self) {
        self.pause();
        self.advance(STEP_FORWARD_FRAMES);
    }

    /// Pause and return to the start of a forward phase with new inputs
    pub fn reset(&mut self) {
        self.pause();
        self.step = 0;
        self.phase = Phase::Forward;
        self.randomize_inputs();
        for c in &mut self.connections {
            c.flow_progress = 0.0;
            c.flow = Flow::None;
        }
        for n in &mut self.neurons {
            n.activated = false;
            n.gradient = 0.0;
        }
    }

    fn advance(&mut self, frames: usize) {
        self.step += frames;
        self.update_flows();

        if self.step >= self.max_steps {
            match self.phase {
                Phase::Forward => {
                    self.forward_pass();
                    self.phase = Phase::Backward;
                }
                Phase::Backward => {
                    self.backward_pass();
                    self.randomize_inputs();
                    self.phase = Phase::Forward;
                }
            }
            tracing::debug!(phase = ?self.phase, "network animation phase complete");
            self.step = 0;
        }
    }

    fn update_flows(&mut self) {
        let n_layers = self.layers.len() as f64;
        let progress = self.step.min(self.max_steps) as f64 / self.max_steps as f64;
        let swept = progress * n_layers;
        let front = swept.floor() as i64;
        let partial = swept.fract();

        match self.phase {
            Phase::Forward => {
                for c in &mut self.connections {
                    let layer = self.neurons[c.from].layer as i64;
                    if layer < front {
                        c.flow_progress = 1.0;
                        c.flow = Flow::Forward;
                    } else if layer == front {
                        c.flow_progress = partial;
                        c.flow = Flow::Forward;
                    } else {
                        c.flow_progress = 0.0;
                    }
                }
                for n in &mut self.neurons {
                    n.activated = n.layer as i64 <= front;
                }
            }
            Phase::Backward => {
                let current = self.layers.len() as i64 - 1 - front;
                for c in &mut self.connections {
                    let layer = self.neurons[c.to].layer as i64;
                    if layer > current {
                        c.flow_progress = 1.0;
                        c.flow = Flow::Backward;
                    } else if layer == current {
                        c.flow_progress = partial;
                        c.flow = Flow::Backward;
                    } else {
                        c.flow_progress = 0.0;
                    }
                }
            }
        }
    }

    /// Render connections, neurons, labels and the phase indicator
    pub fn draw(&self, surface: &mut impl Surface) {
        surface.draw(DrawCommand::Clear);

        for c in &self.connections {
            let from = self.neurons[c.from].position;
            let to = self.neurons[c.to].position;
            let (start, end, color) = match c.flow {
                Flow::Forward => (from, to, FORWARD_COLOR),
                Flow::Backward => (to, from, BACKWARD_COLOR),
                Flow::None => (from, to, NEUTRAL_COLOR),
            };

            surface.draw(DrawCommand::Line {
                from: start,
                to: end,
                stroke: Stroke::solid(NEUTRAL_COLOR, 1.0),
            });
            if c.flow != Flow::None && c.flow_progress > 0.0 {
                let lit = start + (end - start) * c.flow_progress;
                surface.draw(DrawCommand::Line {
                    from: start,
                    to: lit,
                    stroke: Stroke::solid(color, 2.0),
                });
            }
        }

        for n in &self.neurons {
            let lit = n.activated || self.phase == Phase::Backward;
            surface.draw(DrawCommand::Disc {
                center: n.position,
                radius: 15.0,
                color: if lit { ACTIVE_COLOR } else { INACTIVE_COLOR }.to_string(),
            });

            let readout = if self.phase == Phase::Backward && n.gradient != 0.0 {
                Some(format!("{:.3}", n.gradient))
            } else if n.value != 0.0 {
                Some(format!("{:.2}", n.value))
            } else {
                None
            };
            if let Some(text) = readout {
                surface.text(n.position, text, "#e8e6e3", TextAlign::Center);
            }
        }

        let layer_spacing = self.width / (self.layers.len() + 1) as f64;
        for l in 0..self.layers.len() {
            surface.text(
                Vec2::new(layer_spacing * (l + 1) as f64, self.height - 10.0),
                layer_label(l, self.layers.len()),
                "#6b6660",
                TextAlign::Center,
            );
        }

        let (indicator, color) = match self.phase {
            Phase::Forward => ("▶ Forward Pass", FORWARD_COLOR),
            Phase::Backward => ("◀ Backward Pass", BACKWARD_COLOR),
        };
        surface.text(Vec2::new(20.0, 25.0), indicator, color, TextAlign::Left);
    }
}

/// Hoverable network diagram
#[derive(Clone, Debug)]
pub struct StaticNetwork {
    layers: Vec<usize>,
    neurons: Vec<Neuron>,
    hovered: Option<usize>,
    touching: bool,
    width: f64,
    height: f64,
}

impl StaticNetwork {
    pub fn new(layers: &[usize], width: f64, height: f64) -> Self {
        Self {
            layers: layers.to_vec(),
            neurons: layout(layers, width, height),
            hovered: None,
            touching: false,
            width,
            height,
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.neurons = layout(&self.layers, width, height);
        self.hovered = None;
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub fn hovered(&self) -> Option<&Neuron> {
        self.hovered.map(|i| &self.neurons[i])
    }

    /// Mouse moved to canvas coordinates; ignored while a touch is active
    pub fn mouse_move(&mut self, x: f64, y: f64) {
        if !self.touching {
            self.hit_test(x, y);
        }
    }

    pub fn mouse_leave(&mut self) {
        if !self.touching {
            self.hovered = None;
        }
    }

    pub fn touch_start(&mut self, x: f64, y: f64) {
        self.touching = true;
        self.hit_test(x, y);
    }

    pub fn touch_move(&mut self, x: f64, y: f64) {
        self.hit_test(x, y);
    }

    /// Touch lifted or cancelled
    ///
    /// The page keeps the highlight visible briefly before calling this.
    pub fn touch_end(&mut self) {
        self.touching = false;
        self.hovered = None;
    }

    fn hit_test(&mut self, x: f64, y: f64) {
        let radius = if self.touching { TOUCH_RADIUS } else { HOVER_RADIUS };
        let pointer = Vec2::new(x, y);
        self.hovered = self.neurons.iter().position(|n| {
            let d = n.position - pointer;
            (d.x * d.x + d.y * d.y).sqrt() < radius
        });
    }

    /// "Layer 2, Neuron 3" for the touched neuron
    pub fn touch_hint(&self) -> Option<String> {
        if !self.touching {
            return None;
        }
        self.hovered()
            .map(|n| format!("Layer {}, Neuron {}", n.layer + 1, n.index + 1))
    }

    /// Edges touching the hovered neuron, as neuron index pairs
    pub fn highlighted_connections(&self) -> Vec<(usize, usize)> {
        let Some(h) = self.hovered else {
            return Vec::new();
        };
        let layer = self.neurons[h].layer;

        self.neurons
            .iter()
            .enumerate()
            .filter_map(|(i, n)| {
                if n.layer + 1 == layer {
                    Some((i, h))
                } else if n.layer == layer + 1 {
                    Some((h, i))
                } else {
                    None
                }
            })
            .collect()
    }

    pub fn draw(&self, surface: &mut impl Surface) {
        surface.draw(DrawCommand::Clear);

        for a in &self.neurons {
            for b in self.neurons.iter().filter(|b| b.layer == a.layer + 1) {
                surface.draw(DrawCommand::Line {
                    from: a.position,
                    to: b.position,
                    stroke: Stroke::solid(NEUTRAL_COLOR, 1.0),
                });
            }
        }

        for (from, to) in self.highlighted_connections() {
            surface.draw(DrawCommand::Line {
                from: self.neurons[from].position,
                to: self.neurons[to].position,
                stroke: Stroke::solid(ACTIVE_COLOR, 2.0),
            });
        }

        for (i, n) in self.neurons.iter().enumerate() {
            let hovered = self.hovered == Some(i);
            surface.draw(DrawCommand::Disc {
                center: n.position,
                radius: if hovered { 18.0 } else { 14.0 },
                color: if hovered {
                    ACTIVE_COLOR
                } else {
                    LAYER_COLORS[n.layer % LAYER_COLORS.len()]
                }
                .to_string(),
            });
        }

        let layer_spacing = self.width / (self.layers.len() + 1) as f64;
        for l in 0..self.layers.len() {
            surface.text(
                Vec2::new(layer_spacing * (l + 1) as f64, self.height - 10.0),
                layer_label(l, self.layers.len()),
                "#6b6660",
                TextAlign::Center,
            );
        }

        if let (Some(hint), Some(n)) = (self.touch_hint(), self.hovered()) {
            surface.text(
                Vec2::new(n.position.x, n.position.y - 30.0),
                hint,
                "#e8e6e3",
                TextAlign::Center,
            );
        }
    }
}
