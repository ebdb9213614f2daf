//! Structural passes run between parsing and rendering.
//!
//! Both passes keep the origin table in step with the nodes they move, so a
//! writer failing on a generated node still reports the line it came from.

use crate::constants::keys::{HEADERS, LOCATIONS, SERVERS};
use crate::origins::{LineRef, NodeOrigins};
use crate::parser::ParsedConfig;
use crate::value::{child_path, index_path, ConfigValue};
use log::{debug, warn};

/// Runs every pass in order.
pub fn apply_all(parsed: &mut ParsedConfig) {
    distribute_locations(parsed);
    merge_inherited_headers(parsed);
}

fn sequence_items(value: Option<&ConfigValue>, key_path: &str) -> Vec<ConfigValue> {
    match value {
        Some(ConfigValue::Sequence(items)) => items.clone(),
        Some(_) => {
            warn!("Ignoring '{key_path}': expected a sequence");
            Vec::new()
        }
        None => Vec::new(),
    }
}

/// Appends a deep copy of every root-level location to each server's own
/// `locations`, then drops the root-level `locations` key.
///
/// Does nothing when the tree has no `servers` key.
pub fn distribute_locations(parsed: &mut ParsedConfig) {
    let ParsedConfig { tree, origins } = parsed;
    let Some(root) = tree.as_mapping_mut() else {
        return;
    };
    if !root.contains_key(SERVERS) {
        return;
    }

    let root_locations_path = child_path("", LOCATIONS);
    let shared = sequence_items(root.get(LOCATIONS), &root_locations_path);
    let servers_path = child_path("", SERVERS);

    match root.get_mut(SERVERS) {
        Some(ConfigValue::Sequence(servers)) if !shared.is_empty() => {
            for (idx, server) in servers.iter_mut().enumerate() {
                let server_path = index_path(&servers_path, idx);
                let Some(server) = server.as_mapping_mut() else {
                    warn!("Skipping '{server_path}': expected a mapping");
                    continue;
                };
                let locations_path = child_path(&server_path, LOCATIONS);
                if !origins.contains(&locations_path) {
                    if let Some(line) = origins.line_of(&root_locations_path).get() {
                        origins.record(locations_path.clone(), line);
                    }
                }
                let locations = server
                    .entry(LOCATIONS.to_string())
                    .or_insert_with(|| ConfigValue::Sequence(Vec::new()));
                let Some(locations) = locations.as_sequence_mut() else {
                    warn!("Skipping '{locations_path}': expected a sequence");
                    continue;
                };

                let offset = locations.len();
                for (shared_idx, location) in shared.iter().enumerate() {
                    locations.push(location.clone());
                    origins.copy_subtree(
                        &index_path(&root_locations_path, shared_idx),
                        &index_path(&locations_path, offset + shared_idx),
                    );
                }
                debug!("Copied {} shared location(s) into {server_path}", shared.len());
            }
        }
        Some(ConfigValue::Sequence(_)) => {}
        _ => warn!("Ignoring '{servers_path}': expected a sequence"),
    }

    root.shift_remove(LOCATIONS);
}

/// A header inherited by a location, with the KeyPath it was declared at.
struct Inherited {
    value: ConfigValue,
    origin: Vec<(String, usize)>,
}

fn collect_headers(
    owner: Option<&ConfigValue>,
    owner_path: &str,
    origins: &NodeOrigins,
) -> (Vec<Inherited>, LineRef) {
    let headers_path = child_path(owner_path, HEADERS);
    let items = sequence_items(owner.and_then(|o| o.get(HEADERS)), &headers_path);
    let inherited = items
        .into_iter()
        .enumerate()
        .map(|(idx, value)| Inherited {
            value,
            origin: origins.subtree(&index_path(&headers_path, idx)),
        })
        .collect();
    (inherited, origins.line_of(&headers_path))
}

/// Gives every location the effective header list
/// `root.headers ++ server.headers ++ location.headers`, then removes
/// `headers` from the servers and the root.
///
/// Duplicates are kept; order is significant to the dialects.
pub fn merge_inherited_headers(parsed: &mut ParsedConfig) {
    let ParsedConfig { tree, origins } = parsed;
    if tree.get(SERVERS).is_none() {
        return;
    }
    let (root_headers, root_line) = collect_headers(Some(&*tree), "", origins);

    let Some(root) = tree.as_mapping_mut() else {
        return;
    };
    let servers_path = child_path("", SERVERS);

    if let Some(ConfigValue::Sequence(servers)) = root.get_mut(SERVERS) {
        for (server_idx, server) in servers.iter_mut().enumerate() {
            let server_path = index_path(&servers_path, server_idx);
            let (server_headers, server_line) =
                collect_headers(Some(&*server), &server_path, origins);

            let Some(server) = server.as_mapping_mut() else {
                continue;
            };
            let locations_path = child_path(&server_path, LOCATIONS);
            if let Some(ConfigValue::Sequence(locations)) = server.get_mut(LOCATIONS) {
                for (location_idx, location) in locations.iter_mut().enumerate() {
                    let location_path = index_path(&locations_path, location_idx);
                    let (own_headers, own_line) =
                        collect_headers(Some(&*location), &location_path, origins);

                    let merged: Vec<&Inherited> = root_headers
                        .iter()
                        .chain(server_headers.iter())
                        .chain(own_headers.iter())
                        .collect();
                    if merged.is_empty() {
                        continue;
                    }
                    let Some(location) = location.as_mapping_mut() else {
                        warn!("Skipping '{location_path}': expected a mapping");
                        continue;
                    };

                    let headers_path = child_path(&location_path, HEADERS);
                    origins.remove_subtree(&headers_path);
                    let key_line = own_line.get().or(server_line.get()).or(root_line.get());
                    if let Some(line) = key_line {
                        origins.record(headers_path.clone(), line);
                    }
                    for (idx, header) in merged.iter().enumerate() {
                        origins.graft(&index_path(&headers_path, idx), &header.origin);
                    }

                    let values = merged.iter().map(|header| header.value.clone()).collect();
                    location.insert(HEADERS.to_string(), ConfigValue::Sequence(values));
                }
            }
            server.shift_remove(HEADERS);
        }
    }

    root.shift_remove(HEADERS);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use serde_json::json;

    fn to_json(parsed: &ParsedConfig) -> serde_json::Value {
        serde_json::to_value(&parsed.tree).unwrap()
    }

    #[test]
    fn distributes_root_locations_to_every_server() {
        let mut parsed = parse(
            "{servers: [{name: 's1'}, {name: 's2', locations: [{path: '/own'}]}],\n\
             locations: [{path: '/a'}, {path: '/b'}]}",
        )
        .unwrap();
        distribute_locations(&mut parsed);

        assert_eq!(
            to_json(&parsed),
            json!({"servers": [
                {"name": "s1", "locations": [{"path": "/a"}, {"path": "/b"}]},
                {"name": "s2", "locations": [{"path": "/own"}, {"path": "/a"}, {"path": "/b"}]},
            ]})
        );
    }

    #[test]
    fn distributed_locations_are_independent_copies() {
        let mut parsed =
            parse("{servers: [{}, {}], locations: [{path: '/x'}]}").unwrap();
        distribute_locations(&mut parsed);

        let root = parsed.tree.as_mapping_mut().unwrap();
        let servers = root.get_mut(SERVERS).unwrap().as_sequence_mut().unwrap();
        servers[0]
            .as_mapping_mut()
            .unwrap()
            .get_mut(LOCATIONS)
            .unwrap()
            .as_sequence_mut()
            .unwrap()[0] = ConfigValue::str("changed");

        let second = &servers[1].get(LOCATIONS).unwrap().as_sequence().unwrap()[0];
        assert_eq!(second.get("path"), Some(&ConfigValue::str("/x")));
    }

    #[test]
    fn cloned_locations_keep_their_origins() {
        let mut parsed = parse(
            "{\n servers: [{name: 's1'}],\n locations: [\n  {path: '/a'},\n ],\n}",
        )
        .unwrap();
        distribute_locations(&mut parsed);

        let origins = &parsed.origins;
        assert_eq!(origins.line_of(".servers.0.locations"), LineRef::at(3));
        assert_eq!(origins.line_of(".servers.0.locations.0"), LineRef::at(4));
        assert_eq!(origins.line_of(".servers.0.locations.0.path"), LineRef::at(4));
    }

    #[test]
    fn without_servers_nothing_moves() {
        let mut parsed = parse("{locations: [{path: '/x'}], headers: ['A']}").unwrap();
        let before = parsed.clone();
        apply_all(&mut parsed);
        assert_eq!(parsed, before);
    }

    #[test]
    fn merges_headers_root_first() {
        let mut parsed = parse(
            "{headers: ['A'],\n servers: [{headers: ['B'],\n locations: [{headers: ['C']}, {}]}]}",
        )
        .unwrap();
        merge_inherited_headers(&mut parsed);

        assert_eq!(
            to_json(&parsed),
            json!({"servers": [{"locations": [
                {"headers": ["A", "B", "C"]},
                {"headers": ["A", "B"]},
            ]}]})
        );
    }

    #[test]
    fn merged_headers_point_at_their_declarations() {
        let mut parsed = parse(
            "{\n headers: ['A'],\n servers: [{\n  headers: ['B'],\n  locations: [{\n   headers: ['C'],\n  }],\n }],\n}",
        )
        .unwrap();
        merge_inherited_headers(&mut parsed);

        let origins = &parsed.origins;
        let headers = ".servers.0.locations.0.headers";
        assert_eq!(origins.line_of(headers), LineRef::at(6));
        assert_eq!(origins.line_of(&format!("{headers}.0")), LineRef::at(2));
        assert_eq!(origins.line_of(&format!("{headers}.1")), LineRef::at(4));
        assert_eq!(origins.line_of(&format!("{headers}.2")), LineRef::at(6));
    }

    #[test]
    fn duplicates_are_preserved() {
        let mut parsed =
            parse("{headers: ['A'], servers: [{headers: ['A'], locations: [{headers: ['A']}]}]}")
                .unwrap();
        merge_inherited_headers(&mut parsed);
        let location = &parsed.tree.get(SERVERS).unwrap().as_sequence().unwrap()[0]
            .get(LOCATIONS)
            .unwrap()
            .as_sequence()
            .unwrap()[0];
        assert_eq!(
            serde_json::to_value(location).unwrap(),
            json!({"headers": ["A", "A", "A"]})
        );
    }

    #[test]
    fn root_locations_inherit_server_headers_after_distribution() {
        let mut parsed = parse(
            "{servers: [{name: 's1', headers: ['S']}],\n\
             locations: [{path: '/x', headers: ['L']}],\n\
             headers: ['R']}",
        )
        .unwrap();
        apply_all(&mut parsed);
        assert_eq!(
            to_json(&parsed),
            json!({"servers": [{"name": "s1", "locations": [
                {"path": "/x", "headers": ["R", "S", "L"]}
            ]}]})
        );
    }
}
