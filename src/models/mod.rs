pub mod budget;
pub mod chat;

pub use budget::{BadgeQuery, ExpenseDeletion, ExpenseError, NewExpense};
pub use chat::{
    ChatDocument, ChatError, ConversationTurn, NewChatDocument, NewTurn, Role, Topic, TurnContext,
};
