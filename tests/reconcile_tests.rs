mod fixtures;

use fixtures::*;
use ran_cu_operator::config::ConfigValue;
use ran_cu_operator::operator::{dispatch, plan, reconcile, Observation, SideEffect, Trigger};
use ran_cu_operator::relations::RelationId;

#[test]
fn test_first_reconcile_writes_config_with_default_du_port() {
    let env = FakeEnv::ready();
    let ctx = context(&env);

    dispatch(&ctx, Trigger::ConfigChanged).unwrap();

    let content = env.file(CONFIG_PATH).unwrap();
    assert!(content.contains("remote_s_portd = 2153;"));
    assert!(content.contains(r#"gNB_name = "whatever-oai-ran-cu-k8s-cu";"#));
    assert!(content.contains(r#"GNB_IPV4_ADDRESS_FOR_NG_AMF = "1.1.1.1";"#));
    assert_eq!(env.count(is_push), 1);
    assert_eq!(env.count(is_restart), 1);

    let calls = env.calls();
    assert_eq!(calls[0], Call::ConfigureAttachments);
    assert_eq!(calls[1], Call::Push(CONFIG_PATH.to_string()));
    assert_eq!(calls[2], Call::AddLayer("cu".to_string()));
    assert_eq!(calls[3], Call::Replan);
    assert_eq!(calls[4], Call::Restart("cu".to_string()));
}

#[test]
fn test_second_reconcile_only_republishes() {
    let env = FakeEnv::ready();
    env.relate("fiveg_f1", 2, &[("f1_port", "4321")]);
    env.relate("fiveg_gnb_identity", 3, &[]);
    let ctx = context(&env);

    dispatch(&ctx, Trigger::UpdateStatus).unwrap();
    assert_eq!(env.count(is_publish), 2);
    assert_eq!(env.count(|call| matches!(call, Call::Exec(_))), 1);

    env.clear_calls();
    let outcome = dispatch(&ctx, Trigger::UpdateStatus).unwrap();

    assert!(outcome.effects.iter().all(|effect| !effect.is_mutating()));
    assert_eq!(env.count(is_push), 0);
    assert_eq!(env.count(is_restart), 0);
    assert_eq!(env.count(is_publish), 2);
    assert_eq!(env.calls().len(), 2);
}

#[test]
fn test_written_config_is_up_to_date_on_reread() {
    let env = FakeEnv::ready();
    let ctx = context(&env);
    reconcile(&ctx).unwrap();

    let observation = Observation::capture(&ctx).unwrap();
    let effects = plan(&observation, &ctx.settings.workload);
    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, SideEffect::WriteConfig { .. })));
}

#[test]
fn test_surrounding_whitespace_does_not_rewrite() {
    let env = FakeEnv::ready();
    let ctx = context(&env);
    reconcile(&ctx).unwrap();

    let padded = format!("\n{}\n\n", env.file(CONFIG_PATH).unwrap());
    env.world().files.insert(CONFIG_PATH.to_string(), padded);
    env.clear_calls();

    reconcile(&ctx).unwrap();
    assert_eq!(env.count(is_push), 0);
    assert_eq!(env.count(is_restart), 0);
}

#[test]
fn test_malformed_du_port_falls_back_to_default() {
    let env = FakeEnv::ready();
    env.relate("fiveg_f1", 2, &[("f1_port", "that's wrong")]);
    let ctx = context(&env);

    reconcile(&ctx).unwrap();

    let content = env.file(CONFIG_PATH).unwrap();
    assert!(content.contains("remote_s_portd = 2153;"));
}

#[test]
fn test_du_port_change_rewrites_and_restarts() {
    let env = FakeEnv::ready();
    let relation = env.relate("fiveg_f1", 2, &[]);
    let ctx = context(&env);
    reconcile(&ctx).unwrap();
    env.clear_calls();

    env.world()
        .remote_data
        .insert(relation, [("f1_port".to_string(), "4321".to_string())].into());
    reconcile(&ctx).unwrap();

    assert!(env.file(CONFIG_PATH).unwrap().contains("remote_s_portd = 4321;"));
    assert_eq!(env.count(is_push), 1);
    assert_eq!(env.count(is_restart), 1);
}

#[test]
fn test_privilege_granted_even_when_config_unchanged() {
    let env = FakeEnv::ready();
    let ctx = context(&env);
    reconcile(&ctx).unwrap();
    env.clear_calls();

    env.world().privileged = false;
    reconcile(&ctx).unwrap();

    assert_eq!(env.calls(), vec![Call::Grant("cu".to_string())]);
}

#[test]
fn test_route_created_with_second_relation() {
    let env = FakeEnv::ready();
    env.relate("fiveg_core_gnb", 4, &[]);
    env.set_config("upf-subnet", ConfigValue::from("192.168.252.0/24"));
    let ctx = context(&env);

    reconcile(&ctx).unwrap();

    let route = env.calls().into_iter().find_map(|call| match call {
        Call::Exec(command) => Some(command.join(" ")),
        _ => None,
    });
    assert_eq!(
        route.as_deref(),
        Some("ip route replace 192.168.252.0/24 via 192.168.251.1")
    );
}

#[test]
fn test_host_route_created_once() {
    let env = FakeEnv::ready();
    env.relate("fiveg_core_gnb", 4, &[]);
    env.set_config("upf-subnet", ConfigValue::from("192.168.252.5/32"));
    let ctx = context(&env);

    reconcile(&ctx).unwrap();
    assert_eq!(env.count(|call| matches!(call, Call::Exec(_))), 1);
    assert!(env.world().route_table.contains("192.168.252.5 via 192.168.251.1"));

    env.clear_calls();
    let effects = reconcile(&ctx).unwrap();
    assert!(effects.iter().all(|effect| !effect.is_mutating()));
    assert!(env.calls().iter().all(|call| matches!(call, Call::Publish(..))));
}

#[test]
fn test_n2_interface_change_rewrites_config() {
    let env = FakeEnv::ready();
    let ctx = context(&env);
    reconcile(&ctx).unwrap();
    env.clear_calls();

    env.set_config("n2-interface-name", ConfigValue::from("n2"));
    reconcile(&ctx).unwrap();

    assert!(env
        .file(CONFIG_PATH)
        .unwrap()
        .contains(r#"GNB_INTERFACE_NAME_FOR_NG_AMF = "n2";"#));
    assert_eq!(env.count(is_restart), 1);
}

#[test]
fn test_no_route_without_second_relation() {
    let env = FakeEnv::ready();
    let ctx = context(&env);
    reconcile(&ctx).unwrap();
    assert_eq!(env.count(|call| matches!(call, Call::Exec(_))), 0);
}

#[test]
fn test_publications() {
    let env = FakeEnv::ready();
    let f1 = env.relate("fiveg_f1", 2, &[]);
    let core = env.relate(
        "fiveg_core_gnb",
        3,
        &[
            ("tac", "2"),
            ("plmns", r#"[{"mcc":"301","mnc":"21","sst":1,"sd":55}]"#),
        ],
    );
    let identity = env.relate("fiveg_gnb_identity", 4, &[]);
    let ctx = context(&env);

    reconcile(&ctx).unwrap();

    let world = env.world();
    let f1_bag = &world.local_data[&f1];
    assert_eq!(f1_bag["f1_ip_address"], "192.168.254.7");
    assert_eq!(f1_bag["f1_port"], "2152");
    assert_eq!(f1_bag["tac"], "2");
    assert_eq!(f1_bag["plmns"], r#"[{"mcc":"301","mnc":"21","sst":1,"sd":55}]"#);
    assert_eq!(world.local_data[&core]["cu_name"], "whatever-oai-ran-cu-k8s-cu");
    assert_eq!(world.local_data[&identity]["gnb_name"], "whatever-oai-ran-cu-k8s-cu");
    assert_eq!(world.local_data[&identity]["tac"], "2");
}

#[test]
fn test_follower_changes_nothing() {
    let env = FakeEnv::ready();
    env.world().leader = false;
    let ctx = context(&env);

    let outcome = dispatch(&ctx, Trigger::ConfigChanged).unwrap();
    assert!(outcome.effects.is_empty());
    assert!(env.calls().is_empty());
}

#[test]
fn test_unmet_gates_change_nothing() {
    let env = FakeEnv::ready();
    env.world().dirs.clear();
    let ctx = context(&env);
    assert!(reconcile(&ctx).unwrap().is_empty());

    let env = FakeEnv::ready();
    env.world()
        .remote_data
        .get_mut(&RelationId::new("fiveg_n2", 1))
        .unwrap()
        .remove("amf_hostname");
    let ctx = context(&env);
    assert!(reconcile(&ctx).unwrap().is_empty());

    let env = FakeEnv::ready();
    env.world()
        .remote_data
        .get_mut(&RelationId::new("fiveg_n2", 1))
        .unwrap()
        .remove("amf_ip_address");
    env.world().privileged = false;
    let ctx = context(&env);
    assert!(reconcile(&ctx).unwrap().is_empty());
    assert!(env.calls().is_empty());
}

#[test]
fn test_collect_status_never_mutates() {
    let env = FakeEnv::ready();
    let ctx = context(&env);

    let outcome = dispatch(&ctx, Trigger::CollectStatus).unwrap();
    assert!(outcome.effects.is_empty());
    assert!(env.calls().is_empty());
}

#[test]
fn test_failed_effect_aborts_invocation() {
    let env = FakeEnv::ready();
    env.world().privileged = false;
    env.world().fail_grant = true;
    env.relate("fiveg_gnb_identity", 3, &[]);
    let ctx = context(&env);

    assert!(dispatch(&ctx, Trigger::ConfigChanged).is_err());
    assert_eq!(env.count(is_publish), 0);
    assert_eq!(env.status(), None);
}
