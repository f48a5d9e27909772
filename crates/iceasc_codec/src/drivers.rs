//! Checks that every routed net has a single driver.
//!
//! A wire carries at most one bound pip, since [`Context::bind_wire`]
//! replaces the pip of a wire that is bound again. What can still go wrong
//! is the shape of the routing tree: a pip fed from a wire outside its net,
//! or a net with more than one undriven source wire.

use iceasc_netlist::Context;

/// A routing defect that gives a net more than one driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverViolation {
    /// A net wire is driven through a pip whose source belongs elsewhere.
    ForeignPip {
        /// Net name.
        net: String,
        /// Wire name.
        wire: String,
        /// Name of the driving pip.
        pip: String,
    },
    /// A net has several wires without a driving pip.
    SeveralSources {
        /// Net name.
        net: String,
        /// Names of the undriven wires, in wire order.
        wires: Vec<String>,
    },
}

/// Lists the nets of `ctx` that do not form a single-driver routing tree.
pub fn check_driver_uniqueness(ctx: &Context) -> Vec<DriverViolation> {
    let db = ctx.db();
    let mut violations = Vec::new();
    for (_, net) in ctx.nets() {
        let mut sources = Vec::new();
        for nw in net.wires.values() {
            match nw.pip {
                None => sources.push(db.wire_name(nw.wire)),
                Some(pip) if !net.wires.contains_key(&db.pip(pip).src) => {
                    violations.push(DriverViolation::ForeignPip {
                        net: net.name.clone(),
                        wire: db.wire_name(nw.wire),
                        pip: db.pip_name(pip),
                    });
                }
                Some(_) => {}
            }
        }
        if sources.len() > 1 {
            violations.push(DriverViolation::SeveralSources {
                net: net.name.clone(),
                wires: sources,
            });
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use iceasc_arch::{Chip, ChipArgs};

    fn ctx() -> Context {
        Context::new(ChipArgs::new(Chip::Hx1k, "tq144").unwrap()).unwrap()
    }

    #[test]
    fn single_driven_routing_passes() {
        let mut ctx = ctx();
        let net = ctx.add_net("n").unwrap();
        let out = ctx.db().find_wire("X1/Y1/lutff_0/out").unwrap();
        let pip = ctx.db().find_pip("X1/Y1/lutff_0/out.->X1/Y1/local_g0_0").unwrap();
        ctx.bind_wire(net, out, None).unwrap();
        ctx.bind_pip(net, pip).unwrap();
        assert!(check_driver_uniqueness(&ctx).is_empty());
    }

    #[test]
    fn second_source_is_flagged() {
        let mut ctx = ctx();
        let net = ctx.add_net("n").unwrap();
        for name in ["X1/Y1/lutff_0/out", "X1/Y1/lutff_1/out"] {
            let wire = ctx.db().find_wire(name).unwrap();
            ctx.bind_wire(net, wire, None).unwrap();
        }
        let pip = ctx.db().find_pip("X1/Y1/lutff_0/out.->X1/Y1/local_g0_0").unwrap();
        ctx.bind_pip(net, pip).unwrap();
        assert_eq!(
            check_driver_uniqueness(&ctx),
            vec![DriverViolation::SeveralSources {
                net: "n".into(),
                wires: vec!["X1/Y1/lutff_0/out".into(), "X1/Y1/lutff_1/out".into()],
            }]
        );
    }

    #[test]
    fn pip_from_another_net_is_flagged() {
        let mut ctx = ctx();
        let net = ctx.add_net("n").unwrap();
        let pip = ctx.db().find_pip("X1/Y1/local_g0_0.->X1/Y1/lutff_2/in_0").unwrap();
        ctx.bind_pip(net, pip).unwrap();
        assert_eq!(
            check_driver_uniqueness(&ctx),
            vec![DriverViolation::ForeignPip {
                net: "n".into(),
                wire: "X1/Y1/lutff_2/in_0".into(),
                pip: "X1/Y1/local_g0_0.->X1/Y1/lutff_2/in_0".into(),
            }]
        );
    }

    #[test]
    fn rebinding_a_wire_keeps_one_pip() {
        let mut ctx = ctx();
        let net = ctx.add_net("n").unwrap();
        let out = ctx.db().find_wire("X1/Y1/lutff_0/out").unwrap();
        ctx.bind_wire(net, out, None).unwrap();
        let local = ctx.db().find_pip("X1/Y1/lutff_0/out.->X1/Y1/local_g0_0").unwrap();
        ctx.bind_pip(net, local).unwrap();
        let first = ctx.db().find_pip("X1/Y1/local_g0_0.->X1/Y1/lutff_2/in_0").unwrap();
        let second = ctx.db().find_pip("X1/Y1/local_g0_1.->X1/Y1/lutff_2/in_0").unwrap();
        ctx.bind_pip(net, first).unwrap();
        ctx.bind_pip(net, second).unwrap();
        assert_eq!(ctx.pip_net(first), None);
        assert_eq!(ctx.pip_net(second), Some(net));
        let violations = check_driver_uniqueness(&ctx);
        assert_eq!(violations.len(), 1);
        assert!(matches!(&violations[0], DriverViolation::ForeignPip { pip, .. } if pip.starts_with("X1/Y1/local_g0_1")));
    }
}
