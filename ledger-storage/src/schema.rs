//! Hand-written mirror of `migrations/2024-01-01-000000_init/up.sql`. Kept in
//! sync manually (no `diesel print-schema` run in this environment).

diesel::table! {
    event (id) {
        id -> Integer,
        name -> Text,
    }
}

diesel::table! {
    account_version (account) {
        account -> Text,
        version -> BigInt,
    }
}

diesel::table! {
    entry (id) {
        id -> Uuid,
        tx_id -> Uuid,
        event -> Integer,
        operation -> SmallInt,
        version -> BigInt,
        amount -> BigInt,
        competence_date -> Timestamptz,
        created_at -> Timestamptz,
        account -> Text,
        company -> Text,
        metadata -> Jsonb,
    }
}

diesel::allow_tables_to_appear_in_same_query!(entry, account_version, event,);
