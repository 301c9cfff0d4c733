//! Port matching: bind a requested port identifier to a concrete port.
//!
//! Matching runs as an ordered cascade of matcher functions, each returning the
//! local index of the port it picks or `None` to defer to the next rule:
//!
//! 1. junction: first unclaimed wildcard port of the active channel
//! 2. correspondence: inlet→outlet table of asymmetric components
//! 3. single port: the side has exactly one port
//! 4. channel routed: the unique port of the active channel
//! 5. exact: tag equals the requested identifier
//! 6. channel default: `t`, `x` or `W`
//! 7. wide component: repeat 5–6 on the active channel only, with synonyms
//!
//! Rules 1–4 are structural and never fire when the requested identifier is
//! present verbatim on the side, so an exact match always wins.

use std::collections::HashSet;
use std::fmt;

use pn_core::{CompId, Id};
use tracing::trace;

use crate::channel::{Channel, WILDCARD, synonym};
use crate::error::{GraphError, GraphResult};
use crate::graph::{Component, PortGraph};
use crate::kind::ComponentKind;

/// Which side of a component a query addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Input,
    Output,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Input => Side::Output,
            Side::Output => Side::Input,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Input => f.write_str("input"),
            Side::Output => f.write_str("output"),
        }
    }
}

/// The rule that bound a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    Junction,
    Correspondence,
    SinglePort,
    ChannelRouted,
    Exact,
    ChannelDefault,
    WideComponent,
}

impl MatchRule {
    /// Structural rules yield to an exact identifier hit.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            MatchRule::Junction
                | MatchRule::Correspondence
                | MatchRule::SinglePort
                | MatchRule::ChannelRouted
        )
    }
}

/// A single port-matching request.
#[derive(Debug, Clone, Copy)]
pub struct PortQuery<'a> {
    pub side: Side,
    /// Identifier the declaration asked for, if any.
    pub requested: Option<&'a str>,
    pub channel: Channel,
    /// Tag of the input already bound on the same element (output side only).
    pub bound_input: Option<&'a str>,
}

impl<'a> PortQuery<'a> {
    pub fn input(requested: Option<&'a str>, channel: Channel) -> Self {
        Self {
            side: Side::Input,
            requested,
            channel,
            bound_input: None,
        }
    }

    pub fn output(
        requested: Option<&'a str>,
        channel: Channel,
        bound_input: Option<&'a str>,
    ) -> Self {
        Self {
            side: Side::Output,
            requested,
            channel,
            bound_input,
        }
    }
}

/// Outcome of matching one side of a path element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortMatch {
    /// Bound to the port with this arena id (input or output arena per side).
    Bound { port: Id, slot: usize, rule: MatchRule },
    /// Nothing was requested and the side legitimately carries nothing on the
    /// channel: the humidity channel of a component without humidity ports, or
    /// the open side of a source or sink.
    Absent,
}

impl PortMatch {
    pub fn port(self) -> Option<Id> {
        match self {
            PortMatch::Bound { port, .. } => Some(port),
            PortMatch::Absent => None,
        }
    }
}

/// One port as the matchers see it.
#[derive(Debug, Clone)]
pub(crate) struct PortView<'g> {
    pub tag: &'g str,
    pub channel: Channel,
    pub claimed: bool,
}

/// One side of one component, as the matchers see it.
#[derive(Debug, Clone)]
pub(crate) struct SideView<'g> {
    pub kind: &'g ComponentKind,
    pub ports: Vec<PortView<'g>>,
    /// Ports on both sides, for the wide-component rule.
    pub total_ports: usize,
}

impl SideView<'_> {
    fn position(&self, tag: &str) -> Option<usize> {
        self.ports.iter().position(|p| p.tag == tag)
    }

    fn on_channel(&self, channel: Channel) -> Vec<usize> {
        (0..self.ports.len())
            .filter(|&i| self.ports[i].channel == channel)
            .collect()
    }
}

/// A matching rule.
pub(crate) type Matcher = fn(&SideView<'_>, &PortQuery<'_>) -> Option<usize>;

/// The cascade, in evaluation order.
pub(crate) const CASCADE: [(MatchRule, Matcher); 7] = [
    (MatchRule::Junction, match_junction),
    (MatchRule::Correspondence, match_correspondence),
    (MatchRule::SinglePort, match_single_port),
    (MatchRule::ChannelRouted, match_channel_routed),
    (MatchRule::Exact, match_exact),
    (MatchRule::ChannelDefault, match_channel_default),
    (MatchRule::WideComponent, match_wide_component),
];

/// Rule 1: first free branch wins.
pub(crate) fn match_junction(view: &SideView<'_>, query: &PortQuery<'_>) -> Option<usize> {
    if !view.kind.is_junction() {
        return None;
    }
    view.ports
        .iter()
        .position(|p| p.tag == WILDCARD && p.channel == query.channel && !p.claimed)
}

/// Rule 2: outlet paired with the bound inlet through the component's table.
pub(crate) fn match_correspondence(view: &SideView<'_>, query: &PortQuery<'_>) -> Option<usize> {
    if query.side != Side::Output {
        return None;
    }
    let table = view.kind.correspondence()?;
    let inlet = query.bound_input?;
    let (_, outlet) = table.iter().find(|(i, _)| i == inlet)?;
    view.position(outlet)
}

/// Rule 3: trivial passthrough, only on the port's own channel.
pub(crate) fn match_single_port(view: &SideView<'_>, query: &PortQuery<'_>) -> Option<usize> {
    match view.ports.as_slice() {
        [only] if only.channel == query.channel => Some(0),
        _ => None,
    }
}

/// Rule 4: the unique port of the active channel on channel-routed components.
pub(crate) fn match_channel_routed(view: &SideView<'_>, query: &PortQuery<'_>) -> Option<usize> {
    if !view.kind.routes_by_channel() {
        return None;
    }
    match view.on_channel(query.channel).as_slice() {
        [only] => Some(*only),
        _ => None,
    }
}

/// Rule 5: verbatim identifier.
pub(crate) fn match_exact(view: &SideView<'_>, query: &PortQuery<'_>) -> Option<usize> {
    view.position(query.requested?)
}

/// Rule 6: the channel's default tag.
pub(crate) fn match_channel_default(view: &SideView<'_>, query: &PortQuery<'_>) -> Option<usize> {
    view.position(query.channel.default_tag())
}

/// Rule 7: two-stream components; count only the active channel's ports and
/// retry exact/default lookups with synonyms.
pub(crate) fn match_wide_component(view: &SideView<'_>, query: &PortQuery<'_>) -> Option<usize> {
    if !view.kind.is_wide() || view.total_ports <= 4 {
        return None;
    }
    let on_channel = view.on_channel(query.channel);
    if let [only] = on_channel.as_slice() {
        return Some(*only);
    }

    let default = query.channel.default_tag();
    let candidates = [
        query.requested,
        query.requested.and_then(synonym),
        Some(default),
        synonym(default),
    ];
    candidates.into_iter().flatten().find_map(|tag| {
        on_channel
            .iter()
            .copied()
            .find(|&i| view.ports[i].tag == tag)
    })
}

/// Stateful resolver: remembers which junction branches were claimed.
#[derive(Debug, Default, Clone)]
pub struct PortMatcher {
    claimed_outputs: HashSet<Id>,
    claimed_inputs: HashSet<Id>,
}

impl PortMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of junction branches claimed so far.
    pub fn claimed(&self) -> usize {
        self.claimed_outputs.len() + self.claimed_inputs.len()
    }

    fn side_ids<'g>(comp: &'g Component, side: Side) -> &'g [Id] {
        match side {
            Side::Input => &comp.inputs,
            Side::Output => &comp.outputs,
        }
    }

    fn view<'g>(&self, graph: &'g PortGraph, comp: &'g Component, side: Side) -> SideView<'g> {
        let ports = Self::side_ids(comp, side)
            .iter()
            .map(|&id| {
                let (tag, channel, claimed) = match side {
                    Side::Input => {
                        let p = &graph.inputs()[id.slot()];
                        (p.tag.as_str(), p.channel, self.claimed_inputs.contains(&id))
                    }
                    Side::Output => {
                        let p = &graph.outputs()[id.slot()];
                        (p.tag.as_str(), p.channel, self.claimed_outputs.contains(&id))
                    }
                };
                PortView {
                    tag,
                    channel,
                    claimed,
                }
            })
            .collect();
        SideView {
            kind: &comp.kind,
            ports,
            total_ports: comp.port_count(),
        }
    }

    /// Run the cascade for one side of one component.
    pub fn resolve(
        &mut self,
        graph: &PortGraph,
        comp: CompId,
        query: &PortQuery<'_>,
    ) -> GraphResult<PortMatch> {
        let component = graph
            .component(comp)
            .ok_or_else(|| GraphError::UnknownComponent {
                name: comp.to_string(),
            })?;
        let view = self.view(graph, component, query.side);
        let unresolved = || GraphError::PortResolution {
            component: component.name.clone(),
            requested: query.requested.unwrap_or("<default>").to_string(),
            side: query.side,
            channel: query.channel,
        };

        if query.requested.is_none() && view.on_channel(query.channel).is_empty() {
            // A primary channel must flow through from the other side
            let other = self.view(graph, component, query.side.opposite());
            if !query.channel.is_primary() || !other.on_channel(query.channel).is_empty() {
                return Ok(PortMatch::Absent);
            }
            return Err(unresolved());
        }

        let exact_hit = match_exact(&view, query).is_some();
        let hit = CASCADE.iter().find_map(|(rule, matcher)| {
            if exact_hit && rule.is_structural() {
                return None;
            }
            matcher(&view, query).map(|slot| (*rule, slot))
        });

        let Some((rule, slot)) = hit else {
            return Err(unresolved());
        };

        let port = Self::side_ids(component, query.side)[slot];
        if rule == MatchRule::Junction {
            match query.side {
                Side::Input => self.claimed_inputs.insert(port),
                Side::Output => self.claimed_outputs.insert(port),
            };
        }
        trace!(
            component = %component.name,
            side = %query.side,
            channel = %query.channel,
            ?rule,
            slot,
            "port bound"
        );
        Ok(PortMatch::Bound { port, slot, rule })
    }
}
