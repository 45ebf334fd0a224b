//! Computational Graph
//!
//! The textbook example for reverse-mode differentiation:
//!
//! ```text
//! x = 2 ─┐
//!        ├─(+)─▶ q = 5 ─┐
//! y = 3 ─┘              ├─(×)─▶ f = 20
//! z = 4 ────────────────┘
//! ```
//!
//! The forward sweep computes values in node order. The backward sweep seeds
//! ∂f/∂f = 1 and walks the nodes in reverse, multiplying each upstream
//! gradient by the local derivative of the operation:
//!
//! ```text
//! ∂f/∂q = z = 4     ∂f/∂z = q = 5
//! ∂f/∂x = ∂f/∂q · ∂q/∂x = 4 · 1 = 4
//! ∂f/∂y = ∂f/∂q · ∂q/∂y = 4 · 1 = 4
//! ```

use crate::optimizer::Vec2;
use crate::render::{DrawCommand, Stroke, Surface, TextAlign};

/// Node operation; operands are indices of earlier nodes
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Op {
    Input(f64),
    Add(usize, usize),
    Mul(usize, usize),
}

/// Role of a node, used for styling
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Input,
    Op,
    Output,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
    pub id: &'static str,
    pub label: &'static str,
    pub op: Op,
    pub kind: NodeKind,
    pub position: Vec2,
    pub value: f64,
    pub gradient: f64,
}

/// Directed edge with a printable local derivative
#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
    pub from: usize,
    pub to: usize,
    pub local_gradient: f64,
    pub label: String,
}

/// What the graph is currently displaying
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphMode {
    Forward,
    Backward,
}

/// A small expression graph with forward and backward sweeps
#[derive(Clone, Debug)]
pub struct CompGraph {
    nodes: Vec<GraphNode>,
    mode: GraphMode,
}

impl Default for CompGraph {
    fn default() -> Self {
        Self::example(2.0, 3.0, 4.0)
    }
}

impl CompGraph {
    /// f = (x + y) × z with the given inputs
    pub fn example(x: f64, y: f64, z: f64) -> Self {
        let node = |id, label, op, kind, px, py| GraphNode {
            id,
            label,
            op,
            kind,
            position: Vec2::new(px, py),
            value: 0.0,
            gradient: 0.0,
        };

        let mut graph = Self {
            nodes: vec![
                node("x", "x", Op::Input(x), NodeKind::Input, 50.0, 150.0),
                node("y", "y", Op::Input(y), NodeKind::Input, 50.0, 250.0),
                node("z", "z", Op::Input(z), NodeKind::Input, 50.0, 350.0),
                node("q", "q = x + y", Op::Add(0, 1), NodeKind::Op, 250.0, 200.0),
                node("f", "f = q × z", Op::Mul(3, 2), NodeKind::Output, 450.0, 250.0),
            ],
            mode: GraphMode::Forward,
        };
        graph.forward();
        graph.backward();
        graph
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn mode(&self) -> GraphMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: GraphMode) {
        self.mode = mode;
    }

    /// Evaluate every node in order
    pub fn forward(&mut self) {
        for i in 0..self.nodes.len() {
            self.nodes[i].value = match self.nodes[i].op {
                Op::Input(v) => v,
                Op::Add(a, b) => self.nodes[a].value + self.nodes[b].value,
                Op::Mul(a, b) => self.nodes[a].value * self.nodes[b].value,
            };
        }
    }

    /// Accumulate ∂output/∂node for every node
    ///
    /// The last node is the output.
    pub fn backward(&mut self) {
        for n in &mut self.nodes {
            n.gradient = 0.0;
        }
        let Some(last) = self.nodes.last_mut() else {
            return;
        };
        last.gradient = 1.0;

        for i in (0..self.nodes.len()).rev() {
            let upstream = self.nodes[i].gradient;
            match self.nodes[i].op {
                Op::Input(_) => {}
                Op::Add(a, b) => {
                    self.nodes[a].gradient += upstream;
                    self.nodes[b].gradient += upstream;
                }
                Op::Mul(a, b) => {
                    let (va, vb) = (self.nodes[a].value, self.nodes[b].value);
                    self.nodes[a].gradient += upstream * vb;
                    self.nodes[b].gradient += upstream * va;
                }
            }
        }
    }

    /// Edges with their local derivatives
    pub fn edges(&self) -> Vec<GraphEdge> {
        let mut edges = Vec::new();
        for (to, node) in self.nodes.iter().enumerate() {
            match node.op {
                Op::Input(_) => {}
                Op::Add(a, b) => {
                    for from in [a, b] {
                        edges.push(GraphEdge {
                            from,
                            to,
                            local_gradient: 1.0,
                            label: format!("∂{}/∂{} = 1", node.id, self.nodes[from].id),
                        });
                    }
                }
                Op::Mul(a, b) => {
                    for (from, other) in [(a, b), (b, a)] {
                        let other_node = &self.nodes[other];
                        edges.push(GraphEdge {
                            from,
                            to,
                            local_gradient: other_node.value,
                            label: format!(
                                "∂{}/∂{} = {} = {}",
                                node.id, self.nodes[from].id, other_node.id, other_node.value
                            ),
                        });
                    }
                }
            }
        }
        edges
    }

    /// Text inside a node: value going forward, ∇gradient going backward
    pub fn node_readout(&self, node: &GraphNode) -> String {
        match self.mode {
            GraphMode::Forward => format!("{}", node.value),
            GraphMode::Backward => format!("∇{}", node.gradient),
        }
    }

    pub fn caption(&self) -> &'static str {
        match self.mode {
            GraphMode::Forward => "▶ Forward: Computing values",
            GraphMode::Backward => "◀ Backward: Computing gradients",
        }
    }

    /// Render in a 550 × 400 coordinate space
    pub fn draw(&self, surface: &mut impl Surface) {
        let primary = match self.mode {
            GraphMode::Forward => "#4ecdc4",
            GraphMode::Backward => "#c44569",
        };

        surface.draw(DrawCommand::Clear);

        for edge in self.edges() {
            let from = self.nodes[edge.from].position;
            let to = self.nodes[edge.to].position;
            surface.draw(DrawCommand::Line {
                from: Vec2::new(from.x + 40.0, from.y),
                to: Vec2::new(to.x - 40.0, to.y),
                stroke: Stroke::solid(primary, 2.0),
            });
            surface.text(
                Vec2::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0 - 10.0),
                edge.label,
                "#6b6660",
                TextAlign::Center,
            );
        }

        for node in &self.nodes {
            let stroke = match node.kind {
                NodeKind::Output => "#d4a853",
                _ => primary,
            };
            surface.draw(DrawCommand::Ring {
                center: node.position,
                radius: 35.0,
                stroke: Stroke::solid(stroke, 2.0),
            });
            surface.text(
                Vec2::new(node.position.x, node.position.y - 8.0),
                node.label,
                "#e8e6e3",
                TextAlign::Center,
            );
            surface.text(
                Vec2::new(node.position.x, node.position.y + 12.0),
                self.node_readout(node),
                primary,
                TextAlign::Center,
            );
        }

        surface.text(Vec2::new(275.0, 390.0), self.caption(), primary, TextAlign::Center);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingSurface;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_forward_values() {
        let graph = CompGraph::default();
        assert_eq!(graph.node("q").unwrap().value, 5.0);
        assert_eq!(graph.node("f").unwrap().value, 20.0);
    }

    #[test]
    fn test_backward_gradients() {
        let graph = CompGraph::default();
        let grad = |id| graph.node(id).unwrap().gradient;
        assert_eq!(grad("f"), 1.0);
        assert_eq!(grad("q"), 4.0);
        assert_eq!(grad("z"), 5.0);
        assert_eq!(grad("x"), 4.0);
        assert_eq!(grad("y"), 4.0);
    }

    #[test]
    fn test_gradients_match_finite_differences() {
        let (x, y, z) = (1.3, -0.4, 2.2);
        let graph = CompGraph::example(x, y, z);
        let f = |x: f64, y: f64, z: f64| (x + y) * z;
        let h = 1e-6;

        assert_abs_diff_eq!(
            graph.node("x").unwrap().gradient,
            (f(x + h, y, z) - f(x - h, y, z)) / (2.0 * h),
            epsilon = 1e-6
        );
        assert_abs_diff_eq!(
            graph.node("z").unwrap().gradient,
            (f(x, y, z + h) - f(x, y, z - h)) / (2.0 * h),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_edge_labels() {
        let labels: Vec<String> = CompGraph::default()
            .edges()
            .into_iter()
            .map(|e| e.label)
            .collect();
        assert_eq!(
            labels,
            vec!["∂q/∂x = 1", "∂q/∂y = 1", "∂f/∂q = z = 4", "∂f/∂z = q = 5"]
        );
    }

    #[test]
    fn test_mode_switch_changes_readout() {
        let mut graph = CompGraph::default();
        let q = graph.node("q").unwrap().clone();
        assert_eq!(graph.node_readout(&q), "5");

        graph.set_mode(GraphMode::Backward);
        assert_eq!(graph.node_readout(&q), "∇4");

        let mut surface = RecordingSurface::new(550.0, 400.0);
        graph.draw(&mut surface);
        assert!(surface.texts().contains(&"◀ Backward: Computing gradients"));
    }
}
