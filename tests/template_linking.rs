mod common;

use common::Fixture;
use template_engine::error::{CollisionError, EngineError};
use template_engine::db::enums::{DiscoveryFlag, InterfaceKind, ItemType};

#[tokio::test]
async fn linking_copies_the_whole_template_onto_the_host() {
    let mut fx = Fixture::new();
    let template = fx.template("Linux by agent");
    let app = fx.application(template, "CPU");
    let load = fx.agent_item(template, "system.cpu.load");
    let util = fx.agent_item(template, "system.cpu.util");
    fx.item_application(app, load);
    fx.item_application(app, util);
    fx.trigger("CPU load too high", load, ">5");
    fx.graph("CPU usage", &[load, util]);

    let host = fx.host("web-01");
    let interface = fx.agent_interface(host);

    fx.service().link_templates(host, &[template]).await.unwrap();

    assert_eq!(fx.linked_templates(host), vec![template]);

    let items = fx.host_items(host);
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].key, "system.cpu.load");
    assert_eq!(items[0].template_id, Some(load));
    assert_eq!(items[0].interface_id, Some(interface));
    assert_eq!(items[1].key, "system.cpu.util");
    assert_eq!(items[1].template_id, Some(util));

    let apps = fx.host_applications(host);
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].name, "CPU");
    assert_eq!(apps[0].template_id, Some(app));

    // both host items joined the inherited application
    let memberships: Vec<_> = fx
        .store
        .all_item_applications()
        .into_iter()
        .filter(|ia| ia.application_id == apps[0].application_id)
        .collect();
    assert_eq!(memberships.len(), 2);

    let triggers = fx.host_triggers(host);
    assert_eq!(triggers.len(), 1);
    assert_eq!(triggers[0].description, "CPU load too high");
    assert!(triggers[0].template_id.is_some());

    // the copied expression references the host function, not the
    // template one
    let functions = fx.store.all_functions();
    let host_function = functions
        .iter()
        .find(|f| f.trigger_id == triggers[0].trigger_id)
        .unwrap();
    assert_eq!(host_function.item_id, items[0].item_id);
    assert_eq!(
        triggers[0].expression,
        format!("{{{}}}>5", host_function.function_id)
    );

    let graphs = fx.host_graphs(host);
    assert_eq!(graphs.len(), 1);
    assert_eq!(graphs[0].name, "CPU usage");
    assert!(graphs[0].template_id.is_some());
    let host_item_ids: Vec<u64> = items.iter().map(|i| i.item_id).collect();
    let lines: Vec<_> = fx
        .store
        .all_graph_items()
        .into_iter()
        .filter(|gi| gi.graph_id == graphs[0].graph_id)
        .collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|gi| host_item_ids.contains(&gi.item_id)));
}

#[tokio::test]
async fn relinking_the_same_template_changes_nothing() {
    let mut fx = Fixture::new();
    let template = fx.template("Generic");
    let metric = fx.item(template, "net.tcp.listen");
    fx.trigger("Port down", metric, "=0");
    fx.graph("Connections", &[metric]);
    let host = fx.host("web-01");

    let service = fx.service();
    service.link_templates(host, &[template]).await.unwrap();

    let items_before = fx.host_items(host);
    let triggers_before = fx.host_triggers(host);
    let graphs_before = fx.host_graphs(host);
    let deps_before = fx.store.all_dependencies();

    service.link_templates(host, &[template]).await.unwrap();

    assert_eq!(fx.host_items(host), items_before);
    assert_eq!(fx.host_triggers(host), triggers_before);
    assert_eq!(fx.host_graphs(host), graphs_before);
    assert_eq!(fx.store.all_dependencies(), deps_before);
    assert_eq!(fx.linked_templates(host), vec![template]);
}

#[tokio::test]
async fn equivalent_host_trigger_is_adopted_instead_of_duplicated() {
    let mut fx = Fixture::new();
    let template = fx.template("CPU template");
    let template_item = fx.item(template, "system.cpu.load");
    fx.trigger("CPU high", template_item, ">5");

    let host = fx.host("web-01");
    let host_item = fx.item(host, "system.cpu.load");
    let existing = fx.trigger("CPU high", host_item, ">5");

    fx.service().link_templates(host, &[template]).await.unwrap();

    let triggers = fx.host_triggers(host);
    assert_eq!(triggers.len(), 1);
    assert_eq!(triggers[0].trigger_id, existing);
    assert!(triggers[0].template_id.is_some());
}

#[tokio::test]
async fn host_trigger_with_different_threshold_gets_a_separate_copy() {
    let mut fx = Fixture::new();
    let template = fx.template("CPU template");
    let template_item = fx.item(template, "system.cpu.load");
    fx.trigger("CPU high", template_item, ">5");

    let host = fx.host("web-01");
    let host_item = fx.item(host, "system.cpu.load");
    fx.trigger("CPU high", host_item, ">9");

    fx.service().link_templates(host, &[template]).await.unwrap();

    let triggers = fx.host_triggers(host);
    assert_eq!(triggers.len(), 2);
    assert_eq!(
        triggers.iter().filter(|t| t.template_id.is_some()).count(),
        1
    );
}

#[tokio::test]
async fn existing_host_item_is_overwritten_in_place() {
    let mut fx = Fixture::new();
    let template = fx.template("Net template");
    let template_item = fx.item_with(template, "net.if.in", |item| item.delay = 30);
    let host = fx.host("web-01");
    let host_item = fx.item_with(host, "net.if.in", |item| item.delay = 300);

    fx.service().link_templates(host, &[template]).await.unwrap();

    let items = fx.host_items(host);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].item_id, host_item);
    assert_eq!(items[0].delay, 30);
    assert_eq!(items[0].template_id, Some(template_item));
}

#[tokio::test]
async fn matching_host_graph_is_adopted_and_overwritten() {
    let mut fx = Fixture::new();
    let template = fx.template("Net template");
    let inbound = fx.item(template, "net.if.in");
    let outbound = fx.item(template, "net.if.out");
    let template_graph = fx.graph("Traffic", &[inbound, outbound]);
    // give the template graph distinctive drawing attributes
    for mut row in fx.store.all_graphs() {
        if row.graph_id == template_graph {
            row.width = 1200;
            row.height = 400;
            fx.store.add_graph(row);
        }
    }
    for mut line in fx.store.all_graph_items() {
        if line.graph_id == template_graph {
            line.color = "FF0000".into();
            fx.store.add_graph_item(line);
        }
    }

    let host = fx.host("web-01");
    let host_in = fx.item(host, "net.if.in");
    let host_out = fx.item(host, "net.if.out");
    let host_graph = fx.graph("Traffic", &[host_in, host_out]);
    let mut line_ids_before: Vec<u64> = fx
        .store
        .all_graph_items()
        .into_iter()
        .filter(|gi| gi.graph_id == host_graph)
        .map(|gi| gi.graph_item_id)
        .collect();
    line_ids_before.sort_unstable();

    fx.service().link_templates(host, &[template]).await.unwrap();

    // the existing host graph was adopted, not duplicated
    let graphs = fx.host_graphs(host);
    assert_eq!(graphs.len(), 1);
    assert_eq!(graphs[0].graph_id, host_graph);
    assert_eq!(graphs[0].template_id, Some(template_graph));
    assert_eq!(graphs[0].width, 1200);
    assert_eq!(graphs[0].height, 400);

    // its lines survived with their ids, carrying the template's
    // drawing attributes and still pointing at the host items
    let mut lines: Vec<_> = fx
        .store
        .all_graph_items()
        .into_iter()
        .filter(|gi| gi.graph_id == host_graph)
        .collect();
    lines.sort_by_key(|gi| gi.graph_item_id);
    let line_ids: Vec<u64> = lines.iter().map(|gi| gi.graph_item_id).collect();
    assert_eq!(line_ids, line_ids_before);
    assert!(lines.iter().all(|gi| gi.color == "FF0000"));
    assert!(lines
        .iter()
        .all(|gi| gi.item_id == host_in || gi.item_id == host_out));
}

#[tokio::test]
async fn missing_interface_aborts_the_link() {
    let mut fx = Fixture::new();
    let template = fx.template("Agent template");
    fx.agent_item(template, "agent.ping");
    let host = fx.host("bare-host");

    let err = fx
        .service()
        .link_templates(host, &[template])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Collision(CollisionError::MissingInterface(InterfaceKind::Agent))
    ));
    assert!(fx.host_items(host).is_empty());
    assert!(fx.linked_templates(host).is_empty());
}

#[tokio::test]
async fn conflicting_item_keys_between_templates_abort_the_link() {
    let mut fx = Fixture::new();
    let first = fx.template("T1");
    let second = fx.template("T2");
    fx.item(first, "vfs.fs.size");
    fx.item(second, "vfs.fs.size");
    let host = fx.host("web-01");

    let err = fx
        .service()
        .link_templates(host, &[first, second])
        .await
        .unwrap_err();
    match err {
        EngineError::Collision(CollisionError::ItemKey(key)) => {
            assert_eq!(key, "vfs.fs.size");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(fx.host_items(host).is_empty());
    assert!(fx.linked_templates(host).is_empty());
}

#[tokio::test]
async fn duplicate_application_names_fail_before_anything_is_written() {
    let mut fx = Fixture::new();
    let first = fx.template("T1");
    let second = fx.template("T2");
    fx.application(first, "Filesystems");
    fx.application(second, "Filesystems");
    fx.item(first, "a");
    fx.item(second, "b");
    let host = fx.host("web-01");

    let err = fx
        .service()
        .link_templates(host, &[first, second])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Collision(CollisionError::ApplicationName(_))
    ));
    assert!(fx.host_applications(host).is_empty());
    assert!(fx.host_items(host).is_empty());
    assert!(fx.linked_templates(host).is_empty());
}

#[tokio::test]
async fn inventory_slot_conflict_aborts_the_link() {
    let mut fx = Fixture::new();
    let template = fx.template("Inventory template");
    fx.item_with(template, "system.hostname", |item| {
        item.inventory_link = Some(3)
    });
    let host = fx.host("web-01");
    fx.item_with(host, "system.uname", |item| item.inventory_link = Some(3));

    let err = fx
        .service()
        .link_templates(host, &[template])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Collision(CollisionError::InventoryField)
    ));
}

#[tokio::test]
async fn prototype_and_real_item_sharing_a_key_abort_the_link() {
    let mut fx = Fixture::new();
    let template = fx.template("Discovery template");
    fx.item_with(template, "net.if.in[{#IFNAME}]", |item| {
        item.flags = DiscoveryFlag::Prototype
    });
    let host = fx.host("web-01");
    fx.item(host, "net.if.in[{#IFNAME}]");

    let err = fx
        .service()
        .link_templates(host, &[template])
        .await
        .unwrap_err();
    match err {
        EngineError::Collision(CollisionError::ItemPrototypeKey(key)) => {
            assert_eq!(key, "net.if.in[{#IFNAME}]");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // the pre-existing host item is untouched
    let items = fx.host_items(host);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].flags, DiscoveryFlag::Normal);
}

#[tokio::test]
async fn dependencies_between_copied_triggers_are_remapped() {
    let mut fx = Fixture::new();
    let template = fx.template("Dep template");
    let first = fx.item(template, "proc.num[a]");
    let second = fx.item(template, "proc.num[b]");
    let down = fx.trigger("Service A down", first, "=0");
    let up = fx.trigger("Service B down", second, "=0");
    fx.dependency(down, up);

    let host = fx.host("web-01");
    fx.service().link_templates(host, &[template]).await.unwrap();

    let triggers = fx.host_triggers(host);
    assert_eq!(triggers.len(), 2);
    let host_down = triggers
        .iter()
        .find(|t| t.template_id == Some(down))
        .unwrap();
    let host_up = triggers.iter().find(|t| t.template_id == Some(up)).unwrap();

    let deps = fx.store.all_dependencies();
    assert!(deps.iter().any(|d| {
        d.trigger_down_id == host_down.trigger_id && d.trigger_up_id == host_up.trigger_id
    }));
    // the template edge itself is still there
    assert!(deps
        .iter()
        .any(|d| d.trigger_down_id == down && d.trigger_up_id == up));
}

#[tokio::test]
async fn adopted_triggers_do_not_gain_dependency_edges() {
    let mut fx = Fixture::new();
    let template = fx.template("Dep template");
    let first = fx.item(template, "svc.a");
    let second = fx.item(template, "svc.b");
    let down = fx.trigger("Service A down", first, "=0");
    let up = fx.trigger("Service B down", second, "=0");
    fx.dependency(down, up);

    let host = fx.host("web-01");
    let host_first = fx.item(host, "svc.a");
    let host_second = fx.item(host, "svc.b");
    let host_down = fx.trigger("Service A down", host_first, "=0");
    let host_up = fx.trigger("Service B down", host_second, "=0");

    fx.service().link_templates(host, &[template]).await.unwrap();

    // both host triggers were adopted, none created
    let triggers = fx.host_triggers(host);
    assert_eq!(triggers.len(), 2);
    assert_eq!(triggers[0].trigger_id, host_down);
    assert_eq!(triggers[1].trigger_id, host_up);
    assert!(triggers.iter().all(|t| t.template_id.is_some()));

    // only the template edge exists; adoption brings no host edge
    let deps = fx.store.all_dependencies();
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].trigger_down_id, down);
    assert_eq!(deps[0].trigger_up_id, up);
}

#[tokio::test]
async fn dependency_on_a_foreign_host_trigger_keeps_the_original_endpoint() {
    let mut fx = Fixture::new();
    let other_host = fx.host("db-01");
    let other_item = fx.item(other_host, "db.alive");
    let upstream = fx.trigger("Database down", other_item, "=0");

    let template = fx.template("App template");
    let metric = fx.item(template, "app.alive");
    let down = fx.trigger("Application down", metric, "=0");
    fx.dependency(down, upstream);

    let host = fx.host("web-01");
    fx.service().link_templates(host, &[template]).await.unwrap();

    let host_down = fx
        .host_triggers(host)
        .into_iter()
        .find(|t| t.template_id == Some(down))
        .unwrap();
    assert!(fx.store.all_dependencies().iter().any(|d| {
        d.trigger_down_id == host_down.trigger_id && d.trigger_up_id == upstream
    }));
}

#[tokio::test]
async fn linking_to_an_unknown_host_fails() {
    let mut fx = Fixture::new();
    let template = fx.template("T1");
    let err = fx
        .service()
        .link_templates(999, &[template])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Store(_)));
}

#[tokio::test]
async fn any_interface_item_binds_by_configured_priority() {
    let mut fx = Fixture::new();
    let template = fx.template("SSH template");
    fx.item_with(template, "ssh.run[uptime]", |item| {
        item.item_type = ItemType::Ssh
    });
    let host = fx.host("web-01");
    fx.interface(host, InterfaceKind::Ipmi);
    let snmp = fx.interface(host, InterfaceKind::Snmp);

    fx.service().link_templates(host, &[template]).await.unwrap();

    let items = fx.host_items(host);
    assert_eq!(items.len(), 1);
    // agent is absent, so the SNMP interface wins over IPMI
    assert_eq!(items[0].interface_id, Some(snmp));
}
