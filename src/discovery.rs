//! Config-authoring discovery mode.
//!
//! Prints everything a user needs to write the config file: the lights,
//! groups, locations, and scenes the light API reports, then the hardware
//! address of every button press observed. Output goes to stdout on
//! purpose; this mode exists to be read, not parsed.

use std::collections::BTreeMap;
use tokio::sync::mpsc::Receiver;
use tracing::warn;

use crate::light::{LightInfo, LightService, SceneInfo};
use crate::sources::{ButtonEvent, EventKind};

/// Run discovery: print light data once, then echo button addresses until
/// the source channel closes.
pub async fn run<S: LightService>(service: &S, events: &mut Receiver<ButtonEvent>) {
    match service.list_lights().await {
        Ok(lights) => {
            print!("{}", format_lights(&lights));
            print!("{}", format_memberships(&lights, "GROUPS", |l| l.group.as_ref()));
            print!(
                "{}",
                format_memberships(&lights, "LOCATIONS", |l| l.location.as_ref())
            );
        }
        Err(err) => warn!(target: "lightclick::discovery", %err, "Could not fetch light data"),
    }
    match service.list_scenes().await {
        Ok(scenes) => print!("{}", format_scenes(&scenes)),
        Err(err) => warn!(target: "lightclick::discovery", %err, "Could not fetch scene data"),
    }

    println!("\n**********   Running in config mode   **********");
    println!("Now listening for button events. Press a button to display its address.");

    while let Some(event) = events.recv().await {
        match event.kind {
            EventKind::Click { was_queued, .. } if !was_queued => {
                println!("Button pressed: {}", event.address);
            }
            _ => {}
        }
    }
}

fn banner(header: &str) -> String {
    format!(
        "\n-------------------------------------------\n              {header}\n-------------------------------------------\n"
    )
}

/// One line per light: id and label.
fn format_lights(lights: &[LightInfo]) -> String {
    let mut out = banner("LIGHTS");
    for light in lights {
        out.push_str(&format!(
            "Light ID: {}, Light Name: {}\n",
            light.id, light.label
        ));
    }
    out
}

/// Lights grouped by their group or location membership.
fn format_memberships<'a>(
    lights: &'a [LightInfo],
    header: &str,
    member: impl Fn(&'a LightInfo) -> Option<&'a crate::light::GroupRef>,
) -> String {
    let mut groups: BTreeMap<&str, (&str, Vec<&LightInfo>)> = BTreeMap::new();
    for light in lights {
        if let Some(group) = member(light) {
            groups
                .entry(group.id.as_str())
                .or_insert_with(|| (group.name.as_str(), Vec::new()))
                .1
                .push(light);
        }
    }

    let mut out = banner(header);
    for (id, (name, members)) in &groups {
        out.push_str(&format!("ID: {id}, Name: {name}\n"));
        for light in members {
            out.push_str(&format!(
                "            Light ID: {}, Light Name: {}\n",
                light.id, light.label
            ));
        }
    }
    out
}

/// One line per scene: uuid and name.
fn format_scenes(scenes: &[SceneInfo]) -> String {
    let mut out = banner("SCENES");
    for scene in scenes {
        out.push_str(&format!(
            "Scene ID: {}, Scene Name: {}\n",
            scene.uuid, scene.name
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::GroupRef;

    fn light(id: &str, label: &str, group: (&str, &str), location: (&str, &str)) -> LightInfo {
        LightInfo {
            id: id.into(),
            label: label.into(),
            group: Some(GroupRef {
                id: group.0.into(),
                name: group.1.into(),
            }),
            location: Some(GroupRef {
                id: location.0.into(),
                name: location.1.into(),
            }),
        }
    }

    #[test]
    fn lights_listing() {
        let lights = vec![
            light("d1", "Desk", ("g1", "Office"), ("l1", "Home")),
            light("d2", "Shelf", ("g1", "Office"), ("l1", "Home")),
        ];
        let out = format_lights(&lights);
        assert!(out.contains("LIGHTS"));
        assert!(out.contains("Light ID: d1, Light Name: Desk"));
        assert!(out.contains("Light ID: d2, Light Name: Shelf"));
    }

    #[test]
    fn groups_collect_their_lights() {
        let lights = vec![
            light("d1", "Desk", ("g1", "Office"), ("l1", "Home")),
            light("d2", "Lamp", ("g2", "Bedroom"), ("l1", "Home")),
            light("d3", "Shelf", ("g1", "Office"), ("l1", "Home")),
        ];
        let out = format_memberships(&lights, "GROUPS", |l| l.group.as_ref());
        assert!(out.contains("ID: g1, Name: Office"));
        assert!(out.contains("ID: g2, Name: Bedroom"));
        let office_at = out.find("Name: Office").unwrap();
        let bedroom_at = out.find("Name: Bedroom").unwrap();
        let desk_at = out.find("Light Name: Desk").unwrap();
        // Desk is listed under Office, before the Bedroom group starts.
        assert!(office_at < desk_at && desk_at < bedroom_at);
    }

    #[test]
    fn scenes_listing() {
        let scenes = vec![SceneInfo {
            uuid: "abc-123".into(),
            name: "Movie Night".into(),
        }];
        let out = format_scenes(&scenes);
        assert!(out.contains("SCENES"));
        assert!(out.contains("Scene ID: abc-123, Scene Name: Movie Night"));
    }

    #[test]
    fn lights_without_membership_are_skipped_in_groups() {
        let lights = vec![LightInfo {
            id: "d1".into(),
            label: "Desk".into(),
            group: None,
            location: None,
        }];
        let out = format_memberships(&lights, "GROUPS", |l| l.group.as_ref());
        assert!(!out.contains("Light Name: Desk"));
    }
}
