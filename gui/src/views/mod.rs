mod login;
mod pay;
