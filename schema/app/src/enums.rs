use relgraph_core::model::EnumModel;

pub static LEAD_STATUS: EnumModel = EnumModel::new("LeadStatus", &["COLD", "WARM", "HOT", "CONVERTED"]);

pub static ROOM_ROLE: EnumModel = EnumModel::new("RoomRole", &["OWNER", "ADMIN", "MEMBER"]);

pub static PLAN: EnumModel = EnumModel::new("Plan", &["FREE", "PRO", "TEAM"]);

pub static SUBSCRIPTION_STATUS: EnumModel =
    EnumModel::new("SubscriptionStatus", &["TRIALING", "ACTIVE", "PAST_DUE", "CANCELED"]);
