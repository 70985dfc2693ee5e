//! Per-node textual rendering used for logs and golden tests (§6). Every
//! variant of [`Data`] is matched explicitly — no catch-all arm — so that
//! adding a variant without extending this module is a compile error
//! rather than a silently-missing debug line.

use std::fmt;

use crate::node::{Data, Node};

fn fmt_opt_node(value: &Option<crate::index::NodeIndex>) -> String {
    match value {
        Some(n) => format!("{}", n.raw()),
        None => "none".to_string(),
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Data::*;
        match &self.data {
            ConstInt(v) => write!(f, "const_int {v}"),
            ConstFloat(bits) => write!(f, "const_float {}", f64::from_bits(*bits)),
            ConstBool(v) => write!(f, "const_bool {v}"),
            ConstNull => write!(f, "const_null"),
            ConstSlice(s) => write!(f, "const_slice {}", s.raw()),

            LocalRef(l) => write!(f, "local_ref local={}", l.raw()),
            GlobalRef(g, name) => write!(f, "global_ref global={} name={name}", g.raw()),
            AddrLocal(l) => write!(f, "addr_local local={}", l.raw()),
            LoadLocal(l) => write!(f, "load_local local={}", l.raw()),
            StoreLocal(l, v) => write!(f, "store_local local={} value={}", l.raw(), v.raw()),

            Binary(op, lhs, rhs) => {
                write!(f, "binary {} left={} right={}", op.as_str(), lhs.raw(), rhs.raw())
            }
            Unary(op, v) => write!(f, "unary {} value={}", op.as_str(), v.raw()),

            FieldLocal { local, field } => {
                write!(f, "field_local local={} field={} offset={}", local.raw(), field.field_idx, field.offset)
            }
            StoreLocalField { local, field, value } => write!(
                f,
                "store_local_field local={} field={} offset={} value={}",
                local.raw(),
                field.field_idx,
                field.offset,
                value.raw()
            ),
            StoreField { base, field, value } => write!(
                f,
                "store_field base={} field={} offset={} value={}",
                base.raw(),
                field.field_idx,
                field.offset,
                value.raw()
            ),
            FieldValue { base, field } => {
                write!(f, "field_value base={} field={} offset={}", base.raw(), field.field_idx, field.offset)
            }

            IndexLocal { local, index, elem_size } => {
                write!(f, "index_local local={} index={} elem_size={elem_size}", local.raw(), index.raw())
            }
            IndexValue { base, index, elem_size } => {
                write!(f, "index_value base={} index={} elem_size={elem_size}", base.raw(), index.raw())
            }
            StoreIndexLocal { local, index, elem_size, value } => write!(
                f,
                "store_index_local local={} index={} elem_size={elem_size} value={}",
                local.raw(),
                index.raw(),
                value.raw()
            ),
            StoreIndexValue { base, index, elem_size, value } => write!(
                f,
                "store_index_value base={} index={} elem_size={elem_size} value={}",
                base.raw(),
                index.raw(),
                value.raw()
            ),
            SliceLocal { local, elem_size, start, end } => write!(
                f,
                "slice_local local={} elem_size={elem_size} start={} end={}",
                local.raw(),
                fmt_opt_node(start),
                fmt_opt_node(end)
            ),
            SliceValue { base, elem_size, start, end } => write!(
                f,
                "slice_value base={} elem_size={elem_size} start={} end={}",
                base.raw(),
                fmt_opt_node(start),
                fmt_opt_node(end)
            ),

            PtrLoad(l) => write!(f, "ptr_load local={}", l.raw()),
            PtrStore(l, v) => write!(f, "ptr_store local={} value={}", l.raw(), v.raw()),
            PtrField { local, field } => {
                write!(f, "ptr_field local={} field={} offset={}", local.raw(), field.field_idx, field.offset)
            }
            PtrFieldStore { local, field, value } => write!(
                f,
                "ptr_field_store local={} field={} offset={} value={}",
                local.raw(),
                field.field_idx,
                field.offset,
                value.raw()
            ),
            PtrLoadValue(p) => write!(f, "ptr_load_value ptr={}", p.raw()),
            PtrStoreValue(p, v) => write!(f, "ptr_store_value ptr={} value={}", p.raw(), v.raw()),
            AddrOffset { base, offset } => write!(f, "addr_offset base={} offset={offset}", base.raw()),
            AddrIndex { base, index, elem_size } => {
                write!(f, "addr_index base={} index={} elem_size={elem_size}", base.raw(), index.raw())
            }

            Call { name, args, is_builtin } => {
                let args = args.iter().map(|a| a.raw().to_string()).collect::<Vec<_>>().join(",");
                write!(f, "call {name} args=[{args}] is_builtin={is_builtin}")
            }
            Ret(None) => write!(f, "ret void"),
            Ret(Some(v)) => write!(f, "ret value={}", v.raw()),
            Jump(b) => write!(f, "jump block={}", b.raw()),
            Branch { cond, then_block, else_block } => {
                write!(f, "branch cond={} then={} else={}", cond.raw(), then_block.raw(), else_block.raw())
            }
            Phi(sources) => {
                let rendered = sources
                    .iter()
                    .map(|s| format!("block={} value={}", s.block.raw(), s.value.raw()))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "phi [{rendered}]")
            }
            Select { cond, then_value, else_value } => {
                write!(f, "select cond={} then={} else={}", cond.raw(), then_value.raw(), else_value.raw())
            }

            Convert { operand, from_type, to_type } => {
                write!(f, "convert operand={} from={} to={}", operand.raw(), from_type.raw(), to_type.raw())
            }

            ListNew => write!(f, "list_new"),
            ListPush { list, value } => write!(f, "list_push list={} value={}", list.raw(), value.raw()),
            ListGet { list, index } => write!(f, "list_get list={} index={}", list.raw(), index.raw()),
            ListSet { list, index, value } => {
                write!(f, "list_set list={} index={} value={}", list.raw(), index.raw(), value.raw())
            }
            ListLen(l) => write!(f, "list_len list={}", l.raw()),
            ListFree(l) => write!(f, "list_free list={}", l.raw()),

            MapNew => write!(f, "map_new"),
            MapSet { map, key, value } => write!(f, "map_set map={} key={} value={}", map.raw(), key.raw(), value.raw()),
            MapGet { map, key } => write!(f, "map_get map={} key={}", map.raw(), key.raw()),
            MapHas { map, key } => write!(f, "map_has map={} key={}", map.raw(), key.raw()),
            MapFree(m) => write!(f, "map_free map={}", m.raw()),

            StrConcat(a, b) => write!(f, "str_concat left={} right={}", a.raw(), b.raw()),

            UnionInit { variant_idx, payload } => {
                write!(f, "union_init variant={variant_idx} payload={}", fmt_opt_node(payload))
            }
            UnionTag(v) => write!(f, "union_tag value={}", v.raw()),
            UnionPayload { variant_idx, value } => {
                write!(f, "union_payload variant={variant_idx} value={}", value.raw())
            }

            Nop => write!(f, "nop"),
        }
    }
}

#[cfg(test)]
mod tests {
    use bract_ir_utils::Span;

    use super::*;
    use crate::{
        index::{BlockIndex, LocalIdx, NodeIndex},
        ops::BinaryOp,
        types::TypeIndex,
    };

    fn node(data: Data) -> Node {
        Node { data, result_ty: TypeIndex::NULL, span: Span::DUMMY, block: BlockIndex::new(0) }
    }

    // Property 10 (§8): Debug/Display rendering round-trips against a
    // golden table for every `Data` variant. One case per variant below;
    // a new variant added to `Data` without a corresponding arm here still
    // compiles (this isn't exhaustive matching), so anyone adding a
    // variant must remember to extend this table by hand.
    #[test]
    fn golden_forms_for_every_variant() {
        use crate::{
            index::{GlobalIdx, StringIdx},
            node::{FieldRef, PhiSource},
            ops::UnaryOp,
        };

        assert_eq!(node(Data::ConstInt(42)).to_string(), "const_int 42");
        assert_eq!(node(Data::ConstFloat(1.5f64.to_bits())).to_string(), "const_float 1.5");
        assert_eq!(node(Data::ConstBool(true)).to_string(), "const_bool true");
        assert_eq!(node(Data::ConstNull).to_string(), "const_null");
        assert_eq!(node(Data::ConstSlice(StringIdx::new(3))).to_string(), "const_slice 3");

        assert_eq!(node(Data::LocalRef(LocalIdx::new(0))).to_string(), "local_ref local=0");
        assert_eq!(node(Data::GlobalRef(GlobalIdx::new(1), "g".into())).to_string(), "global_ref global=1 name=g");
        assert_eq!(node(Data::AddrLocal(LocalIdx::new(2))).to_string(), "addr_local local=2");
        assert_eq!(node(Data::LoadLocal(LocalIdx::new(3))).to_string(), "load_local local=3");
        assert_eq!(node(Data::StoreLocal(LocalIdx::new(2), NodeIndex::new(3))).to_string(), "store_local local=2 value=3");

        assert_eq!(
            node(Data::Binary(BinaryOp::Add, NodeIndex::new(0), NodeIndex::new(1))).to_string(),
            "binary add left=0 right=1"
        );
        assert_eq!(node(Data::Unary(UnaryOp::Neg, NodeIndex::new(0))).to_string(), "unary neg value=0");

        let field = FieldRef { field_idx: 1, offset: 8 };
        assert_eq!(
            node(Data::FieldLocal { local: LocalIdx::new(0), field }).to_string(),
            "field_local local=0 field=1 offset=8"
        );
        assert_eq!(
            node(Data::StoreLocalField { local: LocalIdx::new(0), field, value: NodeIndex::new(1) }).to_string(),
            "store_local_field local=0 field=1 offset=8 value=1"
        );
        assert_eq!(
            node(Data::StoreField { base: NodeIndex::new(0), field, value: NodeIndex::new(1) }).to_string(),
            "store_field base=0 field=1 offset=8 value=1"
        );
        assert_eq!(
            node(Data::FieldValue { base: NodeIndex::new(0), field }).to_string(),
            "field_value base=0 field=1 offset=8"
        );

        assert_eq!(
            node(Data::IndexLocal { local: LocalIdx::new(0), index: NodeIndex::new(1), elem_size: 4 }).to_string(),
            "index_local local=0 index=1 elem_size=4"
        );
        assert_eq!(
            node(Data::IndexValue { base: NodeIndex::new(0), index: NodeIndex::new(1), elem_size: 4 }).to_string(),
            "index_value base=0 index=1 elem_size=4"
        );
        assert_eq!(
            node(Data::StoreIndexLocal { local: LocalIdx::new(0), index: NodeIndex::new(1), elem_size: 4, value: NodeIndex::new(2) })
                .to_string(),
            "store_index_local local=0 index=1 elem_size=4 value=2"
        );
        assert_eq!(
            node(Data::StoreIndexValue { base: NodeIndex::new(0), index: NodeIndex::new(1), elem_size: 4, value: NodeIndex::new(2) })
                .to_string(),
            "store_index_value base=0 index=1 elem_size=4 value=2"
        );
        assert_eq!(
            node(Data::SliceLocal {
                local: LocalIdx::new(0),
                elem_size: 4,
                start: Some(NodeIndex::new(1)),
                end: None
            })
            .to_string(),
            "slice_local local=0 elem_size=4 start=1 end=none"
        );
        assert_eq!(
            node(Data::SliceValue { base: NodeIndex::new(0), elem_size: 4, start: None, end: Some(NodeIndex::new(2)) })
                .to_string(),
            "slice_value base=0 elem_size=4 start=none end=2"
        );

        assert_eq!(node(Data::PtrLoad(LocalIdx::new(0))).to_string(), "ptr_load local=0");
        assert_eq!(node(Data::PtrStore(LocalIdx::new(0), NodeIndex::new(1))).to_string(), "ptr_store local=0 value=1");
        assert_eq!(
            node(Data::PtrField { local: LocalIdx::new(0), field }).to_string(),
            "ptr_field local=0 field=1 offset=8"
        );
        assert_eq!(
            node(Data::PtrFieldStore { local: LocalIdx::new(0), field, value: NodeIndex::new(1) }).to_string(),
            "ptr_field_store local=0 field=1 offset=8 value=1"
        );
        assert_eq!(node(Data::PtrLoadValue(NodeIndex::new(0))).to_string(), "ptr_load_value ptr=0");
        assert_eq!(node(Data::PtrStoreValue(NodeIndex::new(0), NodeIndex::new(1))).to_string(), "ptr_store_value ptr=0 value=1");
        assert_eq!(node(Data::AddrOffset { base: NodeIndex::new(0), offset: -4 }).to_string(), "addr_offset base=0 offset=-4");
        assert_eq!(
            node(Data::AddrIndex { base: NodeIndex::new(0), index: NodeIndex::new(1), elem_size: 4 }).to_string(),
            "addr_index base=0 index=1 elem_size=4"
        );

        assert_eq!(
            node(Data::Call { name: "foo".into(), args: vec![NodeIndex::new(0), NodeIndex::new(1)].into(), is_builtin: false })
                .to_string(),
            "call foo args=[0,1] is_builtin=false"
        );
        assert_eq!(node(Data::Ret(None)).to_string(), "ret void");
        assert_eq!(node(Data::Ret(Some(NodeIndex::new(4)))).to_string(), "ret value=4");
        assert_eq!(node(Data::Jump(BlockIndex::new(1))).to_string(), "jump block=1");
        assert_eq!(
            node(Data::Branch { cond: NodeIndex::new(0), then_block: BlockIndex::new(1), else_block: BlockIndex::new(2) })
                .to_string(),
            "branch cond=0 then=1 else=2"
        );
        assert_eq!(
            node(Data::Phi(vec![
                PhiSource { block: BlockIndex::new(0), value: NodeIndex::new(1) },
                PhiSource { block: BlockIndex::new(2), value: NodeIndex::new(3) },
            ]
            .into()))
            .to_string(),
            "phi [block=0 value=1, block=2 value=3]"
        );
        assert_eq!(
            node(Data::Select { cond: NodeIndex::new(0), then_value: NodeIndex::new(1), else_value: NodeIndex::new(2) })
                .to_string(),
            "select cond=0 then=1 else=2"
        );

        assert_eq!(
            node(Data::Convert { operand: NodeIndex::new(0), from_type: TypeIndex::NULL, to_type: TypeIndex::NULL }).to_string(),
            "convert operand=0 from=4294967295 to=4294967295"
        );

        assert_eq!(node(Data::ListNew).to_string(), "list_new");
        assert_eq!(node(Data::ListPush { list: NodeIndex::new(0), value: NodeIndex::new(1) }).to_string(), "list_push list=0 value=1");
        assert_eq!(node(Data::ListGet { list: NodeIndex::new(0), index: NodeIndex::new(1) }).to_string(), "list_get list=0 index=1");
        assert_eq!(
            node(Data::ListSet { list: NodeIndex::new(0), index: NodeIndex::new(1), value: NodeIndex::new(2) }).to_string(),
            "list_set list=0 index=1 value=2"
        );
        assert_eq!(node(Data::ListLen(NodeIndex::new(0))).to_string(), "list_len list=0");
        assert_eq!(node(Data::ListFree(NodeIndex::new(0))).to_string(), "list_free list=0");

        assert_eq!(node(Data::MapNew).to_string(), "map_new");
        assert_eq!(
            node(Data::MapSet { map: NodeIndex::new(0), key: NodeIndex::new(1), value: NodeIndex::new(2) }).to_string(),
            "map_set map=0 key=1 value=2"
        );
        assert_eq!(node(Data::MapGet { map: NodeIndex::new(0), key: NodeIndex::new(1) }).to_string(), "map_get map=0 key=1");
        assert_eq!(node(Data::MapHas { map: NodeIndex::new(0), key: NodeIndex::new(1) }).to_string(), "map_has map=0 key=1");
        assert_eq!(node(Data::MapFree(NodeIndex::new(0))).to_string(), "map_free map=0");

        assert_eq!(node(Data::StrConcat(NodeIndex::new(0), NodeIndex::new(1))).to_string(), "str_concat left=0 right=1");

        assert_eq!(
            node(Data::UnionInit { variant_idx: 1, payload: Some(NodeIndex::new(0)) }).to_string(),
            "union_init variant=1 payload=0"
        );
        assert_eq!(node(Data::UnionTag(NodeIndex::new(0))).to_string(), "union_tag value=0");
        assert_eq!(
            node(Data::UnionPayload { variant_idx: 1, value: NodeIndex::new(0) }).to_string(),
            "union_payload variant=1 value=0"
        );

        assert_eq!(node(Data::Nop).to_string(), "nop");
    }
}
